//! Bounded retry with a fixed inter-attempt delay
//!
//! Transient bus noise during one-off reads (calibration ingestion at boot)
//! is tolerated by retrying a small, fixed number of times. Per-sample
//! acquisition paths deliberately do not retry; a fault there propagates
//! immediately.

use embedded_hal::delay::DelayNs;

/// A bounded-retry policy: up to `max_attempts` tries, `delay_ms` apart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds
    pub delay_ms: u32,
}

impl RetryPolicy {
    /// Create a policy with the given attempt ceiling and inter-attempt delay
    pub const fn new(max_attempts: u32, delay_ms: u32) -> Self {
        Self {
            max_attempts,
            delay_ms,
        }
    }

    /// Run `operation` until it succeeds, the error is not retryable, or the
    /// attempt ceiling is reached
    ///
    /// Returns the first success, or the error from the final attempt. The
    /// delay is only taken between attempts, never after the last one.
    pub fn run<T, E>(
        &self,
        delay: &mut impl DelayNs,
        mut operation: impl FnMut() -> Result<T, E>,
        mut retryable: impl FnMut(&E) -> bool,
    ) -> Result<T, E> {
        let mut attempt = 1;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(error) if attempt < self.max_attempts && retryable(&error) => {
                    log::warn!("attempt {}/{} failed, retrying", attempt, self.max_attempts);
                    delay.delay_ms(self.delay_ms);
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}
