//! Retry budget, round ceiling, and wall-clock budget for a run.

use std::time::{Duration, Instant};

use anyhow::{Result, anyhow};

/// Default number of automatic regenerations before escalation.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Bounds how many failed attempts may loop back to ANALYZE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES)
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self { max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// A failed attempt may regenerate only while the counter is below the cap.
    pub fn allows_retry(&self, retry_count: u32) -> bool {
        retry_count < self.max_retries
    }

    /// Upper bound on rounds (entries into ANALYZE or ESCALATE) for one run.
    ///
    /// The longest legal path is `max_retries + 1` generations followed by one
    /// review.
    pub fn round_ceiling(&self) -> u32 {
        self.max_retries.saturating_add(2)
    }
}

/// Deadline used when the configured budget does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Wall-clock budget shared by every collaborator call in one run.
#[derive(Debug, Clone, Copy)]
pub struct RunBudget {
    deadline: Instant,
}

impl RunBudget {
    /// Budget of `total` from now, clamped so the deadline never overflows.
    pub fn starting_now(total: Duration) -> Self {
        let now = Instant::now();
        let deadline = now
            .checked_add(total)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self { deadline }
    }

    /// Time left before the deadline, or an error once it has passed.
    pub fn remaining(&self) -> Result<Duration> {
        let remaining = self
            .deadline
            .checked_duration_since(Instant::now())
            .unwrap_or(Duration::ZERO);
        if remaining.is_zero() {
            return Err(anyhow!("run timed out"));
        }
        Ok(remaining)
    }
}
