//! Chronometer
//!
//! Elapsed-time measurement on a monotonic clock. The clock is injected so
//! that tests and replays can drive time by hand.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Default number of decimals shown by `Chronometer::formatted`.
pub const DEFAULT_PRECISION: usize = 2;

/// Monotonic time source.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;
}

/// The process monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Create a clock frozen at an arbitrary origin.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.origin + offset
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    #[inline]
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Start/stop chronometer.
///
/// Runs from `start` until `stop`, then keeps its last value until `reset`.
#[derive(Debug, Clone, Default)]
pub struct Chronometer {
    started_at: Option<Instant>,
    frozen: Option<Duration>,
}

impl Chronometer {
    /// Idle chronometer reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from `now`, discarding any previous value.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
        self.frozen = None;
    }

    /// Freeze the current value and return it.
    ///
    /// Stopping an idle or already-stopped chronometer returns its value unchanged.
    pub fn stop(&mut self, now: Instant) -> Duration {
        let value = self.elapsed(now);
        if self.is_running() {
            self.frozen = Some(value);
        }
        value
    }

    /// Back to zero, not running.
    pub fn reset(&mut self) {
        self.started_at = None;
        self.frozen = None;
    }

    /// Whether the chronometer is counting.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some() && self.frozen.is_none()
    }

    /// Current reading. Sample this at display cadence while running.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match (self.frozen, self.started_at) {
            (Some(frozen), _) => frozen,
            (None, Some(start)) => now.saturating_duration_since(start),
            (None, None) => Duration::ZERO,
        }
    }

    /// Reading formatted as seconds with `precision` decimals.
    pub fn formatted(&self, now: Instant, precision: usize) -> String {
        format_seconds(self.elapsed(now), precision)
    }
}

/// Round a duration to the nearest centisecond.
pub fn to_centiseconds(duration: Duration) -> u32 {
    let centis = (duration.as_micros() + 5_000) / 10_000;
    u32::try_from(centis).unwrap_or(u32::MAX)
}

/// Convert centiseconds to seconds.
#[inline]
pub fn centiseconds_to_seconds(centiseconds: u32) -> f64 {
    centiseconds as f64 / 100.0
}

/// Format a duration as seconds with `precision` decimals.
pub fn format_seconds(duration: Duration, precision: usize) -> String {
    format!("{:.*}", precision, duration.as_secs_f64())
}
