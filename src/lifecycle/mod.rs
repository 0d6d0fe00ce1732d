//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     Ctrl-C → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every ShutdownSignal observes it
//!     → relay returns Cancelled at its next wait
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
