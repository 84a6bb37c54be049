#![forbid(unsafe_code)]

//! Monotonic time sources.

use std::time::Duration;

use web_time::Instant;

/// A monotonic clock measured from an arbitrary origin.
///
/// The gesture tracker timestamps pointer samples with `now()`; only
/// differences between readings are meaningful.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock backed [`Clock`].
///
/// Uses `web_time::Instant`, so it works on `wasm32-unknown-unknown` as well
/// as native targets.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Convert a duration to fractional milliseconds.
#[inline]
pub fn as_millis_f64(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}
