//! Retry and poll budgets.
//!
//! # Design Decisions
//! - Both loops are bounded by an explicit ceiling
//! - A ceiling of 0 is treated as 1: a call always makes one attempt
//! - Waits happen between attempts only, never after the last one

use std::time::Duration;

use crate::config::{ConfirmConfig, SubmitConfig};

/// Ceiling and delay for submission attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubmitPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub jitter_ratio: f64,
}

impl Default for SubmitPolicy {
    fn default() -> Self {
        Self::from(&SubmitConfig::default())
    }
}

impl From<&SubmitConfig> for SubmitPolicy {
    fn from(config: &SubmitConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            jitter_ratio: config.jitter_ratio,
        }
    }
}

impl SubmitPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Ceiling and interval for outcome polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub max_polls: u32,
    pub poll_interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&ConfirmConfig::default())
    }
}

impl From<&ConfirmConfig> for PollPolicy {
    fn from(config: &ConfirmConfig) -> Self {
        Self {
            max_polls: config.max_polls,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
        }
    }
}

impl PollPolicy {
    pub fn new(max_polls: u32, poll_interval: Duration) -> Self {
        Self {
            max_polls,
            poll_interval,
        }
    }
}

/// Per-call attempt counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryBudget {
    max: u32,
    used: u32,
}

impl RetryBudget {
    pub fn new(max: u32) -> Self {
        Self {
            max: max.max(1),
            used: 0,
        }
    }

    /// Count one attempt and return its 1-based number.
    pub fn record_attempt(&mut self) -> u32 {
        self.used = self.used.saturating_add(1);
        self.used
    }

    pub fn used(&self) -> u32 {
        self.used
    }

    pub fn remaining(&self) -> u32 {
        self.max.saturating_sub(self.used)
    }

    pub fn has_remaining(&self) -> bool {
        self.used < self.max
    }
}
