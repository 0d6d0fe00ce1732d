//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Relay call:
//!     → timeouts.rs (deadline on every RPC)
//!     → On failure: retries.rs (attempt budget) + backoff.rs (fixed delay)
//!
//! Relay confirm:
//!     → retries.rs (poll budget) + backoff.rs (poll interval)
//! ```
//!
//! # Design Decisions
//! - Every external call has a deadline
//! - Every loop has an explicit ceiling
//! - Sleeping goes through `Sleeper` so tests never wait on the wall clock

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use backoff::{Sleeper, TokioSleeper};
pub use retries::{PollPolicy, RetryBudget, SubmitPolicy};
