//! Round clock - elapsed play time with pause/resume accounting
//!
//! The clock reads a monotonic [`TimeSource`] and never the wall clock, so
//! elapsed time is immune to system clock adjustments. Paused intervals are
//! excluded: `pause()` folds the live interval into an accumulator and
//! `resume()` restarts the live interval from "now".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Monotonic millisecond time source.
pub trait TimeSource: Send + Sync {
    /// Milliseconds since an arbitrary fixed origin. Never goes backwards.
    fn now_ms(&self) -> u64;

    /// Wall-clock milliseconds since the Unix epoch (for result timestamps).
    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl<T: TimeSource + ?Sized> TimeSource for Arc<T> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }

    fn epoch_ms(&self) -> u64 {
        (**self).epoch_ms()
    }
}

/// Time source backed by `std::time::Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Manually advanced time source.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the code under test.
#[derive(Debug, Clone, Default)]
pub struct ManualTime {
    now: Arc<AtomicU64>,
    epoch_base_ms: u64,
}

impl ManualTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the epoch reported at `now == 0`, for deterministic timestamps.
    pub fn with_epoch(epoch_base_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(0)),
            epoch_base_ms,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.fetch_max(ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn epoch_ms(&self) -> u64 {
        self.epoch_base_ms + self.now_ms()
    }
}

/// Elapsed-time tracker with pause/resume semantics.
#[derive(Debug, Clone)]
pub struct RoundClock<T> {
    time: T,
    accumulated_ms: u64,
    /// Monotonic time of the last start/resume; `None` while stopped or paused.
    resumed_at: Option<u64>,
    started: bool,
}

impl<T: TimeSource> RoundClock<T> {
    pub fn new(time: T) -> Self {
        Self {
            time,
            accumulated_ms: 0,
            resumed_at: None,
            started: false,
        }
    }

    pub fn time(&self) -> &T {
        &self.time
    }

    /// Current monotonic time of the underlying source.
    pub fn now_ms(&self) -> u64 {
        self.time.now_ms()
    }

    pub fn is_running(&self) -> bool {
        self.resumed_at.is_some()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Start counting from zero.
    pub fn start(&mut self) {
        self.accumulated_ms = 0;
        self.resumed_at = Some(self.time.now_ms());
        self.started = true;
    }

    /// Stop advancing. Idempotent.
    pub fn pause(&mut self) {
        let now = self.time.now_ms();
        self.pause_at(now);
    }

    /// Stop advancing as of monotonic time `at_ms` (clamped to the live interval).
    pub fn pause_at(&mut self, at_ms: u64) {
        if let Some(resumed_at) = self.resumed_at.take() {
            self.accumulated_ms += at_ms.saturating_sub(resumed_at);
        }
    }

    /// Continue advancing from now. Idempotent; no-op before `start()`.
    pub fn resume(&mut self) {
        let now = self.time.now_ms();
        self.resume_at(now);
    }

    /// Continue advancing as if resumed at monotonic time `at_ms`.
    pub fn resume_at(&mut self, at_ms: u64) {
        if self.started && self.resumed_at.is_none() {
            self.resumed_at = Some(at_ms.min(self.time.now_ms()));
        }
    }

    /// Elapsed round time, excluding paused intervals.
    pub fn elapsed_ms(&self) -> u64 {
        match self.resumed_at {
            Some(resumed_at) => {
                self.accumulated_ms + self.time.now_ms().saturating_sub(resumed_at)
            }
            None => self.accumulated_ms,
        }
    }

    /// Monotonic time at which the running clock read `elapsed_ms`.
    ///
    /// While paused this is simply "now".
    pub fn instant_of(&self, elapsed_ms: u64) -> u64 {
        match self.resumed_at {
            Some(resumed_at) => resumed_at + elapsed_ms.saturating_sub(self.accumulated_ms),
            None => self.time.now_ms(),
        }
    }

    /// Zero the clock and clear running state.
    pub fn reset(&mut self) {
        self.accumulated_ms = 0;
        self.resumed_at = None;
        self.started = false;
    }
}
