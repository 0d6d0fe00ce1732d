//! Submit-and-confirm client.
//!
//! # Responsibilities
//! - Submit a request with a bounded number of attempts and a fixed delay
//! - Poll for the request's terminal outcome with a bounded budget
//! - Classify the result as success, remote execution failure, or timeout
//! - Stop at the next wait when shutdown is triggered
//!
//! # State Machine
//! ```text
//! Pending(attempt) ──submit ok──▶ Submitted(receipt)
//!        │                              │
//!   submit err, attempts left      poll: pending, polls left ──▶ (wait, poll again)
//!        │                              │
//!   (wait, attempt + 1)            poll: success ──▶ Confirmed(success)
//!                                  poll: failure ──▶ Confirmed(failure)
//!                                  polls spent   ──▶ TimedOut
//! ```
//!
//! Retrying a failed submission builds no new request; the same request is
//! sent again and may execute twice if an earlier attempt actually reached
//! the ledger. That gap is logged, not guarded.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;

use crate::blockchain::transaction::Request;
use crate::blockchain::transport::LedgerTransport;
use crate::blockchain::types::{
    ConfirmationResult, Execution, OutcomeStatus, Receipt, RelayError, RelayResult,
};
use crate::config::RelayConfig;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::backoff::retry_delay;
use crate::resilience::{PollPolicy, RetryBudget, Sleeper, SubmitPolicy, TokioSleeper};

/// Submit-and-confirm client over any [`LedgerTransport`].
///
/// Holds no mutable state; clones share the transport and may run
/// concurrently.
#[derive(Clone)]
pub struct Relay {
    transport: Arc<dyn LedgerTransport>,
    sleeper: Arc<dyn Sleeper>,
    submit_policy: SubmitPolicy,
    poll_policy: PollPolicy,
    shutdown: ShutdownSignal,
}

impl Relay {
    /// Create a relay with default policies and the tokio timer.
    pub fn new(transport: Arc<dyn LedgerTransport>) -> Self {
        Self {
            transport,
            sleeper: Arc::new(TokioSleeper),
            submit_policy: SubmitPolicy::default(),
            poll_policy: PollPolicy::default(),
            shutdown: ShutdownSignal::never(),
        }
    }

    /// Create a relay using the retry and poll settings of `config`.
    pub fn from_config(transport: Arc<dyn LedgerTransport>, config: &RelayConfig) -> Self {
        Self::new(transport)
            .with_submit_policy(SubmitPolicy::from(&config.submit))
            .with_poll_policy(PollPolicy::from(&config.confirm))
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn with_submit_policy(mut self, policy: SubmitPolicy) -> Self {
        self.submit_policy = policy;
        self
    }

    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    pub fn with_shutdown(mut self, shutdown: ShutdownSignal) -> Self {
        self.shutdown = shutdown;
        self
    }

    pub fn submit_policy(&self) -> &SubmitPolicy {
        &self.submit_policy
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll_policy
    }

    /// Submit `request` under the relay's submit policy.
    pub async fn call(&self, request: &Request) -> RelayResult<Receipt> {
        self.call_with(request, &self.submit_policy).await
    }

    /// Submit `request`, retrying failed attempts up to `policy.max_attempts`.
    ///
    /// Returns the receipt as soon as one attempt is accepted. Confirmation
    /// is a separate step.
    pub async fn call_with(&self, request: &Request, policy: &SubmitPolicy) -> RelayResult<Receipt> {
        let mut budget = RetryBudget::new(policy.max_attempts);

        loop {
            let attempt = budget.record_attempt();

            match self.transport.submit(request).await {
                Ok(receipt) => {
                    metrics::record_submission(true);
                    tracing::info!(
                        receipt = %receipt,
                        entry_point = request.entry_point(),
                        attempt = attempt,
                        "Request accepted"
                    );
                    return Ok(receipt);
                }
                Err(e) => {
                    metrics::record_submission(false);

                    if !budget.has_remaining() {
                        tracing::error!(
                            entry_point = request.entry_point(),
                            attempts = attempt,
                            error = %e,
                            "Submission failed, attempts exhausted"
                        );
                        return Err(RelayError::Remote {
                            attempts: attempt,
                            source: e,
                        });
                    }

                    let delay = retry_delay(policy.retry_delay, policy.jitter_ratio);
                    tracing::warn!(
                        entry_point = request.entry_point(),
                        attempt = attempt,
                        remaining = budget.remaining(),
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Submission failed, resubmitting; an earlier attempt may still execute"
                    );
                    metrics::record_submit_retry();
                    self.wait(delay).await?;
                }
            }
        }
    }

    /// Wait for the outcome of `receipt` under the relay's poll policy.
    pub async fn confirm(&self, receipt: &Receipt) -> RelayResult<serde_json::Value> {
        self.confirm_with(receipt, &self.poll_policy).await
    }

    /// Poll for the outcome of `receipt` at most `policy.max_polls` times.
    ///
    /// A query that fails at the transport level counts as a poll with no
    /// outcome observed.
    pub async fn confirm_with(
        &self,
        receipt: &Receipt,
        policy: &PollPolicy,
    ) -> RelayResult<serde_json::Value> {
        let mut budget = RetryBudget::new(policy.max_polls);

        loop {
            let poll = budget.record_attempt();

            match self.transport.get_outcome(receipt).await {
                Ok(OutcomeStatus::Executed(ConfirmationResult::Success(payload))) => {
                    metrics::record_poll("executed");
                    metrics::record_outcome("success");
                    tracing::info!(receipt = %receipt, polls = poll, "Execution succeeded");
                    return Ok(payload);
                }
                Ok(OutcomeStatus::Executed(ConfirmationResult::Failure(message))) => {
                    metrics::record_poll("executed");
                    metrics::record_outcome("failure");
                    tracing::warn!(
                        receipt = %receipt,
                        polls = poll,
                        error = %message,
                        "Execution failed"
                    );
                    return Err(RelayError::RemoteExecution(message));
                }
                Ok(OutcomeStatus::Pending) => {
                    metrics::record_poll("pending");
                    tracing::debug!(receipt = %receipt, poll = poll, "Outcome pending");
                }
                Err(e) => {
                    metrics::record_poll("error");
                    tracing::warn!(receipt = %receipt, poll = poll, error = %e, "Outcome query failed");
                }
            }

            if !budget.has_remaining() {
                metrics::record_outcome("timeout");
                tracing::error!(receipt = %receipt, polls = poll, "No outcome within poll budget");
                return Err(RelayError::Timeout {
                    receipt: receipt.clone(),
                    polls: poll,
                });
            }

            self.wait(policy.poll_interval).await?;
        }
    }

    /// Submit `request` and wait for its outcome.
    pub async fn execute(&self, request: &Request) -> RelayResult<Execution> {
        let receipt = self.call(request).await?;
        let payload = self.confirm(&receipt).await?;
        Ok(Execution { receipt, payload })
    }

    /// Confirm several receipts concurrently, preserving input order.
    pub async fn confirm_many(
        &self,
        receipts: &[Receipt],
    ) -> Vec<(Receipt, RelayResult<serde_json::Value>)> {
        let results = join_all(receipts.iter().map(|r| self.confirm(r))).await;
        receipts.iter().cloned().zip(results).collect()
    }

    /// Sleep for `duration` unless shutdown fires first.
    async fn wait(&self, duration: Duration) -> RelayResult<()> {
        let mut signal = self.shutdown.clone();
        if signal.is_triggered() {
            return Err(RelayError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = signal.cancelled() => {
                tracing::info!("Wait cancelled by shutdown");
                Err(RelayError::Cancelled)
            }
            _ = self.sleeper.sleep(duration) => Ok(()),
        }
    }
}

impl std::fmt::Debug for Relay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relay")
            .field("submit_policy", &self.submit_policy)
            .field("poll_policy", &self.poll_policy)
            .finish()
    }
}
