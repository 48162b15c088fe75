//! Request pacing.
//!
//! Two policies decide how long the collector waits: [`PageDelay`] before
//! every continuation page, and [`RetryPolicy`] after a failed fetch.  The
//! actual waiting goes through a [`Sleeper`] so tests can record delays
//! instead of blocking.

use std::thread;
use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

/// Blocks the current thread.  Swapped for a recorder in tests.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// The real thing: [`thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// Uniformly random whole-second pause between pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PageDelay {
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for PageDelay {
    fn default() -> Self {
        Self {
            min_delay_secs: 5,
            max_delay_secs: 10,
        }
    }
}

impl PageDelay {
    /// Draw a delay in `[min_delay_secs, max_delay_secs]`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Duration {
        let lo = self.min_delay_secs.min(self.max_delay_secs);
        let hi = self.min_delay_secs.max(self.max_delay_secs);
        Duration::from_secs(rng.gen_range(lo..=hi))
    }
}

/// Bounded exponential backoff for failed fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Consecutive failures tolerated before giving up.
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay_ms: 1_000,
            max_delay_ms: 60_000,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based), or `None` once the
    /// budget is spent.
    pub fn backoff(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.max_retries {
            return None;
        }
        let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
        let delay = self.base_delay_ms.saturating_mul(factor).min(self.max_delay_ms);
        Some(Duration::from_millis(delay))
    }
}
