//! # Fibonacci Backoff
//!
//! Progressive retry delays for failed reconciliations. Grows more slowly than
//! exponential backoff so a webhook that is briefly unavailable (service CA
//! still issuing the serving cert, API server throttling) recovers quickly
//! without hammering the API server when the failure persists.
//!
//! ```rust
//! use resource_override_operator::controller::backoff::FibonacciBackoff;
//!
//! let mut backoff = FibonacciBackoff::new(5, 60);
//! assert_eq!(backoff.next_backoff_seconds(), 5);
//! assert_eq!(backoff.next_backoff_seconds(), 5);
//! assert_eq!(backoff.next_backoff_seconds(), 10);
//! assert_eq!(backoff.next_backoff_seconds(), 15);
//! ```

use std::time::Duration;

/// Fibonacci backoff calculator
///
/// Each delay is the sum of the previous two, starting from `min_secs` and
/// capped at `max_secs`.
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_secs: u64,
    prev_secs: u64,
    current_secs: u64,
    max_secs: u64,
}

impl FibonacciBackoff {
    /// `min_secs` is used for the first two delays; `max_secs` caps the sequence
    ///
    /// Both are at least one second; a zero delay would never grow.
    #[must_use]
    pub fn new(min_secs: u64, max_secs: u64) -> Self {
        let min_secs = min_secs.max(1);
        let max_secs = max_secs.max(1);
        Self {
            min_secs,
            prev_secs: 0,
            current_secs: min_secs.min(max_secs),
            max_secs,
        }
    }

    /// Current delay in seconds; advances the sequence
    pub fn next_backoff_seconds(&mut self) -> u64 {
        let result = self.current_secs;

        let next = self.prev_secs.saturating_add(self.current_secs);
        self.prev_secs = self.current_secs;
        self.current_secs = next.min(self.max_secs);

        result
    }

    #[must_use]
    pub fn next_backoff(&mut self) -> Duration {
        Duration::from_secs(self.next_backoff_seconds())
    }

    /// Restart the sequence after a successful reconciliation
    pub fn reset(&mut self) {
        self.prev_secs = 0;
        self.current_secs = self.min_secs.min(self.max_secs);
    }
}
