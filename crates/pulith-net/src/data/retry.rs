use std::time::Duration;

use rand::Rng;

use crate::core::{decorrelated_jitter, fixed_delays};

/// Delay strategy between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// Same delay before every retry.
    Fixed(Duration),

    /// Randomized, roughly exponential growth. See
    /// [`decorrelated_jitter`](crate::core::decorrelated_jitter).
    DecorrelatedJitter { median_first_delay: Duration },
}

/// How many times to re-attempt a failed operation and how long to wait.
///
/// A policy is a plain value handed to whoever retries; it holds no attempt
/// state, so one policy can serve any number of concurrent calls.
///
/// # Examples
///
/// ```
/// use pulith_net::{Backoff, RetryPolicy};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default()
///     .retries(4)
///     .backoff(Backoff::Fixed(Duration::from_millis(200)));
/// assert_eq!(policy.max_attempts(), 5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Guarded attempts before the final attempt.
    ///
    /// Total attempts = retries + 1
    ///
    /// Default: 3
    pub retries: u32,

    /// Default: 500ms fixed
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self { Self::fixed() }
}

impl RetryPolicy {
    pub const FIXED_DELAY: Duration = Duration::from_millis(500);

    /// General-purpose retry: 3 retries, 500ms apart.
    pub fn fixed() -> Self {
        Self { retries: 3, backoff: Backoff::Fixed(Self::FIXED_DELAY) }
    }

    /// Remote procedure call retry: 5 retries, 500ms apart.
    pub fn rpc() -> Self {
        Self { retries: 5, backoff: Backoff::Fixed(Self::FIXED_DELAY) }
    }

    /// HTTP pipeline retry: 5 retries with decorrelated jitter around a 1s
    /// median first delay.
    pub fn http() -> Self {
        Self {
            retries: 5,
            backoff: Backoff::DecorrelatedJitter { median_first_delay: Duration::from_secs(1) },
        }
    }

    /// Never retry.
    pub fn none() -> Self {
        Self { retries: 0, backoff: Backoff::Fixed(Duration::ZERO) }
    }

    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    #[must_use]
    pub fn backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn max_attempts(&self) -> u32 { self.retries.saturating_add(1) }

    /// Delay schedule for one retried call, one entry per retry.
    pub fn delays(&self) -> Vec<Duration> { self.delays_with(&mut rand::rng()) }

    pub fn delays_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Duration> {
        match self.backoff {
            Backoff::Fixed(delay) => fixed_delays(delay, self.retries),
            Backoff::DecorrelatedJitter { median_first_delay } => {
                decorrelated_jitter(median_first_delay, self.retries, rng)
            }
        }
    }
}
