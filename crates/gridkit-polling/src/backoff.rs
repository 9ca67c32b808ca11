//! Linear back-off for repeatedly failing poll handlers

use std::time::Duration;

/// Delay before the next run after `fail_count` consecutive failures.
///
/// `interval * (fail_count + 1)`: the nominal interval when the last run
/// succeeded, one more interval for every failure since.
pub fn backoff_delay(interval: Duration, fail_count: u32) -> Duration {
    interval.saturating_mul(fail_count.saturating_add(1))
}

/// Linear back-off bound to a nominal interval.
///
/// # Example
///
/// ```
/// use gridkit_polling::LinearBackoff;
/// use std::time::Duration;
///
/// let backoff = LinearBackoff::new(Duration::from_secs(5));
///
/// assert_eq!(backoff.delay_after(0), Duration::from_secs(5));
/// assert_eq!(backoff.delay_after(2), Duration::from_secs(15));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    interval: Duration,
    /// Optional ceiling; `None` lets the delay grow without bound
    max_delay: Option<Duration>,
}

impl LinearBackoff {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_delay: None,
        }
    }

    /// Cap the delay at `max_delay`.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay.max(self.interval));
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Delay to wait after `fail_count` consecutive failures.
    pub fn delay_after(&self, fail_count: u32) -> Duration {
        let delay = backoff_delay(self.interval, fail_count);
        match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        }
    }
}
