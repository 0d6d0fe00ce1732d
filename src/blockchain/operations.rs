//! Typed contract operations.
//!
//! One enum per contract family. Each variant fixes the entry point name,
//! the argument names and types, and the payment the call usually needs, so
//! a call cannot be built with a missing or mistyped argument.

use alloy::primitives::U256;

use crate::blockchain::args::{ContractHash, Key, RuntimeArgs};
use crate::blockchain::transaction::Request;
use crate::config::DeployConfig;

/// Motes per CSPR.
const CSPR: u64 = 1_000_000_000;

/// A contract call that can be turned into a [`Request`].
pub trait Operation {
    fn entry_point(&self) -> &'static str;

    fn args(&self) -> RuntimeArgs;

    /// Payment used when the caller gives none; `None` defers to config.
    fn default_payment(&self) -> Option<u64> {
        None
    }

    /// Build a request against `contract`. An explicit `payment` wins over
    /// the operation default, which wins over `defaults.payment_amount`.
    fn to_request(
        &self,
        contract: ContractHash,
        payment: Option<u64>,
        defaults: &DeployConfig,
    ) -> Request {
        let mut builder = Request::builder(contract, self.entry_point()).args(self.args());
        if let Some(motes) = payment.or(self.default_payment()) {
            builder = builder.payment(motes);
        }
        builder.build(defaults)
    }
}

/// Staking pool management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StakingCall {
    AddNewPool {
        lp_contract: ContractHash,
        alloc_point: u64,
        acc_reward_per_share: U256,
        min_stake_duration: U256,
        penalty_rate: U256,
        last_reward_second: u64,
    },
    Stake {
        pool_id: u64,
        amount: U256,
        stake_duration: U256,
    },
    UnStake {
        pool_id: u64,
        amount: U256,
    },
    GetPendingRewards {
        pool_id: u64,
        user: Key,
    },
    SetSupportToken {
        nft_contract: ContractHash,
        enabled: bool,
    },
    TransferOwner {
        new_owner: Key,
    },
    ChangeFee {
        fee: U256,
    },
}

impl Operation for StakingCall {
    fn entry_point(&self) -> &'static str {
        match self {
            StakingCall::AddNewPool { .. } => "add_new_pool",
            StakingCall::Stake { .. } => "stake",
            StakingCall::UnStake { .. } => "un_stake",
            StakingCall::GetPendingRewards { .. } => "get_pending_rewards",
            StakingCall::SetSupportToken { .. } => "set_support_token",
            StakingCall::TransferOwner { .. } => "transfer_owner",
            StakingCall::ChangeFee { .. } => "change_fee",
        }
    }

    fn args(&self) -> RuntimeArgs {
        let args = RuntimeArgs::new();
        match self {
            StakingCall::AddNewPool {
                lp_contract,
                alloc_point,
                acc_reward_per_share,
                min_stake_duration,
                penalty_rate,
                last_reward_second,
            } => args
                .insert("alloc_point", *alloc_point)
                .insert("lp_contract_hash", Key::from(*lp_contract))
                .insert("acc_reward_per_share", *acc_reward_per_share)
                .insert("min_stake_duration", *min_stake_duration)
                .insert("penalty_rate", *penalty_rate)
                .insert("last_reward_second", *last_reward_second),
            StakingCall::Stake {
                pool_id,
                amount,
                stake_duration,
            } => args
                .insert("pool_id", *pool_id)
                .insert("amount", *amount)
                .insert("stake_duration", *stake_duration),
            StakingCall::UnStake { pool_id, amount } => {
                args.insert("pool_id", *pool_id).insert("amount", *amount)
            }
            StakingCall::GetPendingRewards { pool_id, user } => {
                args.insert("pool_id", *pool_id).insert("user", *user)
            }
            StakingCall::SetSupportToken {
                nft_contract,
                enabled,
            } => args
                .insert("nft_enabled", *enabled)
                .insert("nft_contract_hash", Key::from(*nft_contract)),
            StakingCall::TransferOwner { new_owner } => args.insert("contract_owner", *new_owner),
            StakingCall::ChangeFee { fee } => args.insert("market_fee", *fee),
        }
    }

    fn default_payment(&self) -> Option<u64> {
        Some(match self {
            StakingCall::AddNewPool { .. } => 10 * CSPR,
            StakingCall::Stake { .. } => 50 * CSPR,
            StakingCall::UnStake { .. } => 100 * CSPR,
            StakingCall::GetPendingRewards { .. } => 50 * CSPR,
            StakingCall::SetSupportToken { .. }
            | StakingCall::TransferOwner { .. }
            | StakingCall::ChangeFee { .. } => CSPR,
        })
    }
}

/// Fungible token operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenCall {
    Transfer {
        recipient: Key,
        amount: U256,
    },
    Approve {
        spender: Key,
        amount: U256,
    },
    /// Let `operator` move every token of the caller.
    SetApprovalForAll {
        operator: Key,
    },
    Burn {
        owner: Key,
        amount: U256,
    },
    Deposit {
        owner: Key,
        token: ContractHash,
        amount: U256,
    },
    Redeem {
        owner: Key,
        token: ContractHash,
        amount: U256,
    },
    SetSupportedToken {
        token: ContractHash,
        enabled: bool,
    },
    SetSupportedTokenDecimals {
        token: ContractHash,
        decimals: u8,
    },
}

impl Operation for TokenCall {
    fn entry_point(&self) -> &'static str {
        match self {
            TokenCall::Transfer { .. } => "transfer",
            TokenCall::Approve { .. } => "approve",
            TokenCall::SetApprovalForAll { .. } => "set_approval_for_all",
            TokenCall::Burn { .. } => "burn",
            TokenCall::Deposit { .. } => "deposit",
            TokenCall::Redeem { .. } => "redeem",
            TokenCall::SetSupportedToken { .. } => "set_supported_token",
            TokenCall::SetSupportedTokenDecimals { .. } => "set_supported_token_decimals",
        }
    }

    fn args(&self) -> RuntimeArgs {
        let args = RuntimeArgs::new();
        match self {
            TokenCall::Transfer { recipient, amount } => {
                args.insert("recipient", *recipient).insert("amount", *amount)
            }
            TokenCall::Approve { spender, amount } => {
                args.insert("spender", *spender).insert("amount", *amount)
            }
            TokenCall::SetApprovalForAll { operator } => args.insert("operator", *operator),
            TokenCall::Burn { owner, amount } => {
                args.insert("owner", *owner).insert("amount", *amount)
            }
            TokenCall::Deposit {
                owner,
                token,
                amount,
            } => args
                .insert("owner", *owner)
                .insert("deposit_token", Key::from(*token))
                .insert("amount", *amount),
            TokenCall::Redeem {
                owner,
                token,
                amount,
            } => args
                .insert("owner", *owner)
                .insert("redeem_token", Key::from(*token))
                .insert("amount", *amount),
            TokenCall::SetSupportedToken { token, enabled } => args
                .insert("supported_token", Key::from(*token))
                .insert("enabled", *enabled),
            TokenCall::SetSupportedTokenDecimals { token, decimals } => args
                .insert("supported_token", Key::from(*token))
                .insert("decimals", *decimals),
        }
    }

    fn default_payment(&self) -> Option<u64> {
        Some(match self {
            TokenCall::Transfer { .. }
            | TokenCall::Approve { .. }
            | TokenCall::SetApprovalForAll { .. }
            | TokenCall::Burn { .. } => CSPR,
            TokenCall::Deposit { .. } | TokenCall::Redeem { .. } => 5 * CSPR,
            TokenCall::SetSupportedToken { .. } | TokenCall::SetSupportedTokenDecimals { .. } => {
                3 * CSPR
            }
        })
    }
}

/// How a marketplace NFT is identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenIdentifier {
    Index(u64),
    Hash(String),
}

impl TokenIdentifier {
    /// Marketplace entry points declare both `token_id` and `token_hash`;
    /// the unused one is sent zeroed.
    fn apply(&self, args: RuntimeArgs) -> RuntimeArgs {
        match self {
            TokenIdentifier::Index(id) => args.insert("token_id", *id).insert("token_hash", ""),
            TokenIdentifier::Hash(hash) => {
                args.insert("token_id", 0u64).insert("token_hash", hash.as_str())
            }
        }
    }
}

/// NFT marketplace operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketCall {
    Offer {
        nft_contract: ContractHash,
        token: TokenIdentifier,
        minimum_offer: U256,
    },
    ChangeOffer {
        nft_contract: ContractHash,
        token: TokenIdentifier,
        new_minimum_offer: U256,
    },
    Bid {
        nft_contract: ContractHash,
        token: TokenIdentifier,
        bidding_offer: U256,
    },
    IncreaseBid {
        nft_contract: ContractHash,
        token: TokenIdentifier,
        new_offer: U256,
    },
    RevokeOffer {
        nft_contract: ContractHash,
        token: TokenIdentifier,
    },
    RevokeBid {
        nft_contract: ContractHash,
        token: TokenIdentifier,
    },
    ChangeFee {
        fee: U256,
    },
    ChangeRoyaltyFee {
        fee: U256,
    },
}

impl Operation for MarketCall {
    fn entry_point(&self) -> &'static str {
        match self {
            MarketCall::Offer { .. } => "offer",
            MarketCall::ChangeOffer { .. } => "change_offer",
            MarketCall::Bid { .. } => "bid",
            MarketCall::IncreaseBid { .. } => "increase_bid",
            MarketCall::RevokeOffer { .. } => "revoke_offer",
            MarketCall::RevokeBid { .. } => "revoke_bid",
            MarketCall::ChangeFee { .. } => "change_fee",
            MarketCall::ChangeRoyaltyFee { .. } => "change_royalty_fee",
        }
    }

    fn args(&self) -> RuntimeArgs {
        let args = RuntimeArgs::new();
        match self {
            MarketCall::Offer {
                nft_contract,
                token,
                minimum_offer,
            } => token.apply(
                args.insert("nft_contract_hash", Key::from(*nft_contract))
                    .insert("minimum_offer", *minimum_offer),
            ),
            MarketCall::ChangeOffer {
                nft_contract,
                token,
                new_minimum_offer,
            } => token.apply(
                args.insert("nft_contract_hash", Key::from(*nft_contract))
                    .insert("new_minimum_offer", *new_minimum_offer),
            ),
            MarketCall::Bid {
                nft_contract,
                token,
                bidding_offer,
            } => token.apply(
                args.insert("nft_contract_hash", Key::from(*nft_contract))
                    .insert("bidding_offer", *bidding_offer),
            ),
            MarketCall::IncreaseBid {
                nft_contract,
                token,
                new_offer,
            } => token.apply(
                args.insert("nft_contract_hash", Key::from(*nft_contract))
                    .insert("new_offer", *new_offer),
            ),
            MarketCall::RevokeOffer {
                nft_contract,
                token,
            }
            | MarketCall::RevokeBid {
                nft_contract,
                token,
            } => token.apply(args.insert("nft_contract_hash", Key::from(*nft_contract))),
            MarketCall::ChangeFee { fee } => args.insert("market_fee", *fee),
            MarketCall::ChangeRoyaltyFee { fee } => args.insert("royalty_fee", *fee),
        }
    }

    fn default_payment(&self) -> Option<u64> {
        match self {
            MarketCall::ChangeFee { .. } | MarketCall::ChangeRoyaltyFee { .. } => Some(CSPR),
            _ => None,
        }
    }
}
