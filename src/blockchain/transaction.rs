//! Contract-call and contract-install requests.
//!
//! # Responsibilities
//! - Hold an immutable request: session code, typed arguments, payment, ttl
//! - Resolve the resource budget (payment) and time-to-live from defaults
//! - Render the unsigned envelope handed to the signing gateway
//!
//! The envelope is not a signed Casper deploy: it carries no header, hash,
//! approvals or payment session. A gateway in front of the node signs it and
//! wraps it into a deploy before `account_put_deploy` reaches a real node.

use std::time::Duration;

use alloy::hex;
use serde_json::{json, Value};

use crate::blockchain::args::{ArgValue, ContractHash, RuntimeArgs};
use crate::config::DeployConfig;

/// Entry point the ledger runs for module-bytes sessions.
const INSTALL_ENTRY_POINT: &str = "call";

/// Payment for installing a contract when none is given: 200 CSPR.
pub const DEFAULT_INSTALL_PAYMENT: u64 = 200_000_000_000;

/// Code executed by a request.
#[derive(Clone, PartialEq, Eq)]
pub enum Session {
    /// Call `entry_point` on an installed contract.
    StoredContractByHash {
        contract: ContractHash,
        entry_point: String,
    },
    /// Run compiled wasm, which installs the contract it carries.
    ModuleBytes(Vec<u8>),
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Session::StoredContractByHash {
                contract,
                entry_point,
            } => f
                .debug_struct("StoredContractByHash")
                .field("contract", contract)
                .field("entry_point", entry_point)
                .finish(),
            Session::ModuleBytes(bytes) => write!(f, "ModuleBytes({} bytes)", bytes.len()),
        }
    }
}

/// An immutable ledger request.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    session: Session,
    args: RuntimeArgs,
    payment: u64,
    ttl: Duration,
}

impl Request {
    /// Start building a call to `entry_point` on `contract`.
    pub fn builder(contract: ContractHash, entry_point: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(Session::StoredContractByHash {
            contract,
            entry_point: entry_point.into(),
        })
    }

    /// Start building an install of the compiled contract in `module_bytes`.
    /// Unless overridden, the payment is [`DEFAULT_INSTALL_PAYMENT`].
    pub fn install(module_bytes: Vec<u8>) -> RequestBuilder {
        RequestBuilder::new(Session::ModuleBytes(module_bytes)).payment_or(DEFAULT_INSTALL_PAYMENT)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Target contract; `None` for installs.
    pub fn contract(&self) -> Option<&ContractHash> {
        match &self.session {
            Session::StoredContractByHash { contract, .. } => Some(contract),
            Session::ModuleBytes(_) => None,
        }
    }

    pub fn entry_point(&self) -> &str {
        match &self.session {
            Session::StoredContractByHash { entry_point, .. } => entry_point,
            Session::ModuleBytes(_) => INSTALL_ENTRY_POINT,
        }
    }

    pub fn args(&self) -> &RuntimeArgs {
        &self.args
    }

    /// Resource budget in motes.
    pub fn payment(&self) -> u64 {
        self.payment
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Unsigned envelope for the signing gateway's `account_put_deploy`.
    pub fn to_envelope(&self, chain_name: &str) -> Value {
        let session = match &self.session {
            Session::StoredContractByHash {
                contract,
                entry_point,
            } => json!({
                "StoredContractByHash": {
                    "hash": contract.to_hex(),
                    "entry_point": entry_point,
                    "args": self.args.to_json(),
                }
            }),
            Session::ModuleBytes(bytes) => json!({
                "ModuleBytes": {
                    "module_bytes": hex::encode(bytes),
                    "args": self.args.to_json(),
                }
            }),
        };

        json!({
            "chain_name": chain_name,
            "ttl_ms": self.ttl.as_millis() as u64,
            "payment": self.payment.to_string(),
            "session": session,
        })
    }
}

/// Builder for [`Request`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    session: Session,
    args: RuntimeArgs,
    payment: Option<u64>,
    ttl: Option<Duration>,
}

impl RequestBuilder {
    fn new(session: Session) -> Self {
        Self {
            session,
            args: RuntimeArgs::new(),
            payment: None,
            ttl: None,
        }
    }

    pub fn arg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.args = self.args.insert(name, value);
        self
    }

    pub fn args(mut self, args: RuntimeArgs) -> Self {
        self.args = args;
        self
    }

    pub fn payment(mut self, motes: u64) -> Self {
        self.payment = Some(motes);
        self
    }

    /// Set the payment only if none was given yet.
    pub fn payment_or(mut self, motes: u64) -> Self {
        self.payment.get_or_insert(motes);
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Finish the request, filling unset payment and ttl from `defaults`.
    pub fn build(self, defaults: &DeployConfig) -> Request {
        Request {
            session: self.session,
            args: self.args,
            payment: self.payment.unwrap_or(defaults.payment_amount),
            ttl: self.ttl.unwrap_or_else(|| defaults.ttl()),
        }
    }
}
