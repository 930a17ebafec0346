use std::thread::sleep;
use std::time::Duration;

use chrono::NaiveDate;
use log::{error, warn};

use crate::error::{Result, ScrapeError};

/// Bounded retry with exponential backoff for one date's page load.
///
/// A single attempt (the default) means no retry: the first error is returned
/// unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 1,
            initial_backoff: Duration::from_secs(2),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based): doubles each time, capped.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Runs `op` until it succeeds, fails with a non-transient error, or the
    /// attempts run out.
    pub fn run<T, F>(&self, date: NaiveDate, mut op: F) -> Result<T>
    where
        F: FnMut(u32) -> Result<T>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        "{}: attempt {}/{} failed ({}), retrying in {:?}",
                        date, attempt, self.max_attempts, e, delay
                    );
                    sleep(delay);
                    attempt += 1;
                }
                Err(e) if e.is_transient() && attempt > 1 => {
                    error!("{}: exhausted {} attempt(s): {}", date, attempt, e);
                    return Err(ScrapeError::RetriesExhausted {
                        date,
                        attempts: attempt,
                        source: Box::new(e),
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
}
