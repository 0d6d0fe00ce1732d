//! Submit-and-confirm relay for contract calls on a remote ledger.
//!
//! Submissions are unsigned envelopes, not Casper deploys. Point
//! `node.rpc_url` at a gateway that signs and forwards them; a bare node
//! rejects every submission. Outcome polling and state reads use the
//! standard node RPC.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use blockchain::{JsonRpcTransport, Relay};
pub use config::RelayConfig;
pub use lifecycle::Shutdown;
