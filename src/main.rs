//! ledger-relay command-line interface.
//!
//! ```text
//! config (TOML + RELAY_* env)
//!     → JsonRpcTransport (node endpoint, chain name)
//!     → Relay (submit policy, poll policy, Ctrl-C cancellation)
//!     → typed operation or wasm install → Request → call → confirm
//!     → state reads (named keys, dictionaries) straight from the node
//!     → JSON result on stdout, logs on stderr
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use clap::{Args, Parser, Subcommand};
use serde_json::json;

use ledger_relay::blockchain::{
    ContractHash, JsonRpcTransport, Key, MarketCall, NamedArg, Operation, Receipt, Relay,
    Request, StakingCall, TokenCall, TokenIdentifier,
};
use ledger_relay::config::{load_config, RelayConfig};
use ledger_relay::lifecycle::{signals, Shutdown};
use ledger_relay::observability::{logging, metrics};
use ledger_relay::resilience::PollPolicy;

#[derive(Parser)]
#[command(name = "ledger-relay")]
#[command(about = "Submit contract calls to a ledger node and wait for their outcome", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check node reachability and chain name
    Status,
    /// Wait for the outcome of already submitted requests
    Confirm {
        /// Receipts (deploy hashes) to confirm.
        #[arg(required = true)]
        receipts: Vec<String>,

        #[arg(long)]
        max_polls: Option<u32>,

        #[arg(long)]
        poll_interval_ms: Option<u64>,
    },
    /// Staking pool calls
    Staking {
        #[command(flatten)]
        target: Target,

        #[command(subcommand)]
        op: StakingOp,
    },
    /// Fungible token calls
    Token {
        #[command(flatten)]
        target: Target,

        #[command(subcommand)]
        op: TokenOp,
    },
    /// NFT marketplace calls
    Market {
        #[command(flatten)]
        target: Target,

        #[command(subcommand)]
        op: MarketOp,
    },
    /// Install a contract from compiled wasm
    Install {
        /// Path to the contract wasm.
        #[arg(long)]
        wasm: PathBuf,

        /// Init argument as name:type=value; repeatable.
        #[arg(long = "arg")]
        args: Vec<NamedArg>,

        /// Payment in motes; defaults to 200 CSPR.
        #[arg(long)]
        payment: Option<u64>,

        /// Return after submission without confirming.
        #[arg(long)]
        no_wait: bool,
    },
    /// Read contract state
    Query {
        /// Contract name from `[contracts]` or a contract hash.
        #[arg(long)]
        contract: String,

        #[command(subcommand)]
        read: QueryOp,
    },
}

#[derive(Subcommand)]
enum QueryOp {
    /// Value under a named key, e.g. total_supply
    NamedKey {
        #[arg(long)]
        name: String,
    },
    /// Dictionary item, e.g. an entry of balances
    Dictionary {
        #[arg(long)]
        dictionary: String,
        #[arg(long)]
        key: String,
    },
}

/// Options shared by every contract call.
#[derive(Args)]
struct Target {
    /// Contract name from `[contracts]` or a contract hash.
    #[arg(long)]
    contract: Option<String>,

    /// Payment in motes, overriding operation and config defaults.
    #[arg(long)]
    payment: Option<u64>,

    /// Return after submission without confirming.
    #[arg(long)]
    no_wait: bool,
}

#[derive(Subcommand)]
enum StakingOp {
    AddPool {
        #[arg(long)]
        lp_contract: ContractHash,
        #[arg(long)]
        alloc_point: u64,
        #[arg(long)]
        acc_reward_per_share: U256,
        #[arg(long)]
        min_stake_duration: U256,
        #[arg(long)]
        penalty_rate: U256,
        #[arg(long)]
        last_reward_second: u64,
    },
    Stake {
        #[arg(long)]
        pool_id: u64,
        #[arg(long)]
        amount: U256,
        #[arg(long)]
        duration: U256,
    },
    Unstake {
        #[arg(long)]
        pool_id: u64,
        #[arg(long)]
        amount: U256,
    },
    PendingRewards {
        #[arg(long)]
        pool_id: u64,
        #[arg(long)]
        user: Key,
    },
    SetSupportToken {
        #[arg(long)]
        nft_contract: ContractHash,
        #[arg(long)]
        enabled: bool,
    },
    TransferOwner {
        #[arg(long)]
        new_owner: Key,
    },
    ChangeFee {
        #[arg(long)]
        fee: U256,
    },
}

impl From<StakingOp> for StakingCall {
    fn from(op: StakingOp) -> Self {
        match op {
            StakingOp::AddPool {
                lp_contract,
                alloc_point,
                acc_reward_per_share,
                min_stake_duration,
                penalty_rate,
                last_reward_second,
            } => StakingCall::AddNewPool {
                lp_contract,
                alloc_point,
                acc_reward_per_share,
                min_stake_duration,
                penalty_rate,
                last_reward_second,
            },
            StakingOp::Stake {
                pool_id,
                amount,
                duration,
            } => StakingCall::Stake {
                pool_id,
                amount,
                stake_duration: duration,
            },
            StakingOp::Unstake { pool_id, amount } => StakingCall::UnStake { pool_id, amount },
            StakingOp::PendingRewards { pool_id, user } => {
                StakingCall::GetPendingRewards { pool_id, user }
            }
            StakingOp::SetSupportToken {
                nft_contract,
                enabled,
            } => StakingCall::SetSupportToken {
                nft_contract,
                enabled,
            },
            StakingOp::TransferOwner { new_owner } => StakingCall::TransferOwner { new_owner },
            StakingOp::ChangeFee { fee } => StakingCall::ChangeFee { fee },
        }
    }
}

#[derive(Subcommand)]
enum TokenOp {
    Transfer {
        #[arg(long)]
        recipient: Key,
        #[arg(long)]
        amount: U256,
    },
    Approve {
        #[arg(long)]
        spender: Key,
        #[arg(long)]
        amount: U256,
    },
    SetApprovalForAll {
        #[arg(long)]
        operator: Key,
    },
    Burn {
        #[arg(long)]
        owner: Key,
        #[arg(long)]
        amount: U256,
    },
    Deposit {
        #[arg(long)]
        owner: Key,
        #[arg(long)]
        token: ContractHash,
        #[arg(long)]
        amount: U256,
    },
    Redeem {
        #[arg(long)]
        owner: Key,
        #[arg(long)]
        token: ContractHash,
        #[arg(long)]
        amount: U256,
    },
    SetSupportedToken {
        #[arg(long)]
        token: ContractHash,
        #[arg(long)]
        enabled: bool,
    },
    SetDecimals {
        #[arg(long)]
        token: ContractHash,
        #[arg(long)]
        decimals: u8,
    },
}

impl From<TokenOp> for TokenCall {
    fn from(op: TokenOp) -> Self {
        match op {
            TokenOp::Transfer { recipient, amount } => TokenCall::Transfer { recipient, amount },
            TokenOp::Approve { spender, amount } => TokenCall::Approve { spender, amount },
            TokenOp::SetApprovalForAll { operator } => TokenCall::SetApprovalForAll { operator },
            TokenOp::Burn { owner, amount } => TokenCall::Burn { owner, amount },
            TokenOp::Deposit {
                owner,
                token,
                amount,
            } => TokenCall::Deposit {
                owner,
                token,
                amount,
            },
            TokenOp::Redeem {
                owner,
                token,
                amount,
            } => TokenCall::Redeem {
                owner,
                token,
                amount,
            },
            TokenOp::SetSupportedToken { token, enabled } => {
                TokenCall::SetSupportedToken { token, enabled }
            }
            TokenOp::SetDecimals { token, decimals } => {
                TokenCall::SetSupportedTokenDecimals { token, decimals }
            }
        }
    }
}

/// NFT selector: exactly one of id or hash.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct NftRef {
    #[arg(long)]
    token_id: Option<u64>,
    #[arg(long)]
    token_hash: Option<String>,
}

impl NftRef {
    fn identifier(self) -> TokenIdentifier {
        match (self.token_id, self.token_hash) {
            (Some(id), _) => TokenIdentifier::Index(id),
            (None, Some(hash)) => TokenIdentifier::Hash(hash),
            (None, None) => TokenIdentifier::Index(0),
        }
    }
}

#[derive(Subcommand)]
enum MarketOp {
    Offer {
        #[arg(long)]
        nft_contract: ContractHash,
        #[command(flatten)]
        token: NftRef,
        #[arg(long)]
        minimum_offer: U256,
    },
    ChangeOffer {
        #[arg(long)]
        nft_contract: ContractHash,
        #[command(flatten)]
        token: NftRef,
        #[arg(long)]
        new_minimum_offer: U256,
    },
    Bid {
        #[arg(long)]
        nft_contract: ContractHash,
        #[command(flatten)]
        token: NftRef,
        #[arg(long)]
        offer: U256,
    },
    IncreaseBid {
        #[arg(long)]
        nft_contract: ContractHash,
        #[command(flatten)]
        token: NftRef,
        #[arg(long)]
        new_offer: U256,
    },
    RevokeOffer {
        #[arg(long)]
        nft_contract: ContractHash,
        #[command(flatten)]
        token: NftRef,
    },
    RevokeBid {
        #[arg(long)]
        nft_contract: ContractHash,
        #[command(flatten)]
        token: NftRef,
    },
    ChangeFee {
        #[arg(long)]
        fee: U256,
    },
    ChangeRoyaltyFee {
        #[arg(long)]
        fee: U256,
    },
}

impl From<MarketOp> for MarketCall {
    fn from(op: MarketOp) -> Self {
        match op {
            MarketOp::Offer {
                nft_contract,
                token,
                minimum_offer,
            } => MarketCall::Offer {
                nft_contract,
                token: token.identifier(),
                minimum_offer,
            },
            MarketOp::ChangeOffer {
                nft_contract,
                token,
                new_minimum_offer,
            } => MarketCall::ChangeOffer {
                nft_contract,
                token: token.identifier(),
                new_minimum_offer,
            },
            MarketOp::Bid {
                nft_contract,
                token,
                offer,
            } => MarketCall::Bid {
                nft_contract,
                token: token.identifier(),
                bidding_offer: offer,
            },
            MarketOp::IncreaseBid {
                nft_contract,
                token,
                new_offer,
            } => MarketCall::IncreaseBid {
                nft_contract,
                token: token.identifier(),
                new_offer,
            },
            MarketOp::RevokeOffer {
                nft_contract,
                token,
            } => MarketCall::RevokeOffer {
                nft_contract,
                token: token.identifier(),
            },
            MarketOp::RevokeBid {
                nft_contract,
                token,
            } => MarketCall::RevokeBid {
                nft_contract,
                token: token.identifier(),
            },
            MarketOp::ChangeFee { fee } => MarketCall::ChangeFee { fee },
            MarketOp::ChangeRoyaltyFee { fee } => MarketCall::ChangeRoyaltyFee { fee },
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }
    logging::init_logging(&config.observability)?;

    if let Some(addr) = &config.observability.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let transport = Arc::new(JsonRpcTransport::new(&config.node)?);

    let shutdown = Shutdown::new();
    signals::spawn_interrupt_handler(shutdown.clone());
    let relay = Relay::from_config(transport.clone(), &config).with_shutdown(shutdown.subscribe());

    match cli.command {
        Commands::Status => {
            let chain = transport.node_chain_name().await?;
            print_json(&json!({
                "rpc_url": config.node.rpc_url,
                "chain_name": chain,
                "expected_chain_name": config.node.chain_name,
                "matches": chain == config.node.chain_name,
            }))?;
        }
        Commands::Confirm {
            receipts,
            max_polls,
            poll_interval_ms,
        } => {
            let defaults = relay.poll_policy();
            let policy = PollPolicy::new(
                max_polls.unwrap_or(defaults.max_polls),
                poll_interval_ms
                    .map(Duration::from_millis)
                    .unwrap_or(defaults.poll_interval),
            );
            let relay = relay.clone().with_poll_policy(policy);
            let receipts: Vec<Receipt> = receipts.into_iter().map(Receipt::from).collect();

            let mut failed = 0;
            let mut report = Vec::new();
            for (receipt, result) in relay.confirm_many(&receipts).await {
                match result {
                    Ok(payload) => report.push(json!({ "receipt": receipt, "payload": payload })),
                    Err(e) => {
                        failed += 1;
                        report.push(json!({ "receipt": receipt, "error": e.to_string() }));
                    }
                }
            }
            print_json(&json!(report))?;
            if failed > 0 {
                return Err(format!("{} of {} confirmations failed", failed, receipts.len()).into());
            }
        }
        Commands::Staking { target, op } => {
            run_call(&relay, &config, "staking", target, &StakingCall::from(op)).await?;
        }
        Commands::Token { target, op } => {
            run_call(&relay, &config, "token", target, &TokenCall::from(op)).await?;
        }
        Commands::Market { target, op } => {
            run_call(&relay, &config, "market", target, &MarketCall::from(op)).await?;
        }
        Commands::Install {
            wasm,
            args,
            payment,
            no_wait,
        } => {
            let module_bytes = std::fs::read(&wasm)?;
            let mut builder = Request::install(module_bytes);
            for NamedArg { name, value } in args {
                builder = builder.arg(name, value);
            }
            if let Some(motes) = payment {
                builder = builder.payment(motes);
            }
            let request = builder.build(&config.deploy);

            tracing::info!(
                wasm = %wasm.display(),
                args = request.args().len(),
                payment = request.payment(),
                "Installing contract"
            );
            submit_and_report(&relay, &request, no_wait).await?;
        }
        Commands::Query { contract, read } => {
            let contract = resolve_contract(&config, &contract, Some(contract.as_str()))?;
            let value = match &read {
                QueryOp::NamedKey { name } => transport.named_key_value(&contract, name).await?,
                QueryOp::Dictionary { dictionary, key } => {
                    transport.dictionary_item(&contract, dictionary, key).await?
                }
            };
            print_json(&json!({ "contract": contract.to_string(), "value": value }))?;
        }
    }

    Ok(())
}

/// Resolve `--contract` against `[contracts]`, falling back to parsing it as
/// a hash. Without the flag, `default_name` is looked up.
fn resolve_contract(
    config: &RelayConfig,
    default_name: &str,
    requested: Option<&str>,
) -> Result<ContractHash, Box<dyn std::error::Error>> {
    let name = requested.unwrap_or(default_name);
    let raw = match config.contracts.get(name) {
        Some(hash) => hash.as_str(),
        None if requested.is_some() => name,
        None => {
            return Err(format!(
                "no contract named '{}' in [contracts]; pass --contract",
                default_name
            )
            .into())
        }
    };
    Ok(raw.parse::<ContractHash>()?)
}

async fn run_call(
    relay: &Relay,
    config: &RelayConfig,
    family: &str,
    target: Target,
    op: &dyn Operation,
) -> Result<(), Box<dyn std::error::Error>> {
    let contract = resolve_contract(config, family, target.contract.as_deref())?;
    let request = op.to_request(contract, target.payment, &config.deploy);

    tracing::info!(
        contract = %contract,
        entry_point = request.entry_point(),
        payment = request.payment(),
        "Sending contract call"
    );

    submit_and_report(relay, &request, target.no_wait).await
}

async fn submit_and_report(
    relay: &Relay,
    request: &Request,
    no_wait: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let receipt = relay.call(request).await?;
    if no_wait {
        print_json(&json!({ "receipt": receipt }))?;
        return Ok(());
    }

    let payload = relay.confirm(&receipt).await?;
    print_json(&json!({ "receipt": receipt, "payload": payload }))?;
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
