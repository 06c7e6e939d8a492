//! End-of-round summary handed to match persistence.

use serde::{Deserialize, Serialize};

/// Immutable summary of a finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// `"{player_id}_{timestamp_ms}"`
    pub id: String,
    pub player_id: String,
    pub score: u32,
    /// Round-clock time played (pauses excluded).
    pub duration_ms: u64,
    /// Upper-case tier name, e.g. `"NORMAL"`.
    pub difficulty: String,
    /// Unix epoch milliseconds at the end of the round.
    pub timestamp_ms: u64,
    #[serde(default)]
    pub correct_taps: u32,
    #[serde(default)]
    pub total_taps: u32,
    /// Sum of reveal-to-tap latency over all reward taps.
    #[serde(default)]
    pub total_reflex_time_ms: u64,
    /// Longest run of reward taps without a miss or a hazard in between.
    #[serde(default)]
    pub perfect_streak: u32,
}

impl MatchResult {
    /// Mean reveal-to-tap latency over reward taps.
    pub fn average_reflex_ms(&self) -> Option<u64> {
        if self.correct_taps == 0 {
            None
        } else {
            Some(self.total_reflex_time_ms / self.correct_taps as u64)
        }
    }

    /// Share of valid taps that hit a reward, in `0.0..=1.0`.
    pub fn accuracy(&self) -> f32 {
        if self.total_taps == 0 {
            0.0
        } else {
            self.correct_taps as f32 / self.total_taps as f32
        }
    }
}

/// Per-round tap statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TapStats {
    pub correct_taps: u32,
    pub total_taps: u32,
    pub total_reflex_time_ms: u64,
    pub current_streak: u32,
    pub best_streak: u32,
}

impl TapStats {
    pub fn record_reward(&mut self, reflex_ms: u64) {
        self.correct_taps += 1;
        self.total_taps += 1;
        self.total_reflex_time_ms += reflex_ms;
        self.current_streak += 1;
        self.best_streak = self.best_streak.max(self.current_streak);
    }

    pub fn record_hazard(&mut self) {
        self.total_taps += 1;
        self.current_streak = 0;
    }

    pub fn record_miss(&mut self) {
        self.current_streak = 0;
    }
}
