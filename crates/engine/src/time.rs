//! Tokio-backed time source.

use tile_reflex_core::TimeSource;
use tokio::time::Instant;

/// Monotonic time read from the tokio clock.
///
/// Follows `tokio::time::pause`/`advance`, so runtime tests can move time by hand.
#[derive(Debug, Clone, Copy)]
pub struct TokioTime {
    origin: Instant,
}

impl TokioTime {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for TokioTime {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}
