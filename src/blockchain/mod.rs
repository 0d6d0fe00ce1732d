//! Ledger integration subsystem.
//!
//! # Data Flow
//! ```text
//! operations.rs (typed call) or an install (wasm) + args.rs (typed values)
//!     → transaction.rs (immutable Request with payment and ttl)
//!     → client.rs (Relay: bounded submit, bounded confirm)
//!     → transport.rs (LedgerTransport seam)
//!     → rpc.rs (JSON-RPC over HTTP with timeouts)
//! ```
//!
//! # Constraints
//! - No signing: submissions go to a signing gateway, not a bare node
//! - State reads go straight to the node and bypass the relay
//! - Contract hashes and endpoints come from configuration, never globals
//! - Every RPC call has a deadline

pub mod args;
pub mod client;
pub mod operations;
pub mod rpc;
pub mod transaction;
pub mod transport;
pub mod types;

pub use args::{ArgValue, ContractHash, Key, NamedArg, RuntimeArgs};
pub use client::Relay;
pub use operations::{MarketCall, Operation, StakingCall, TokenCall, TokenIdentifier};
pub use rpc::JsonRpcTransport;
pub use transaction::{Request, Session};
pub use transport::LedgerTransport;
pub use types::{
    ConfirmationResult, Execution, OutcomeStatus, Receipt, RelayError, RelayResult,
    TransportError,
};
