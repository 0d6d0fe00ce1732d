//! The seam between the relay and a ledger node.

use async_trait::async_trait;

use crate::blockchain::transaction::Request;
use crate::blockchain::types::{OutcomeStatus, Receipt, TransportResult};

/// Opaque access to a ledger that accepts requests and later reports their
/// outcome. Wire format and signing belong to the implementation.
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Submit `request` once. A successful return means the node accepted it.
    async fn submit(&self, request: &Request) -> TransportResult<Receipt>;

    /// Look up the execution outcome for `receipt`, once.
    async fn get_outcome(&self, receipt: &Receipt) -> TransportResult<OutcomeStatus>;
}
