//! Reveal scheduler - wait, reveal, expire
//!
//! The scheduler runs on round-clock time, not wall time. Because the round
//! clock stops while the round is paused, both the inter-reveal wait and the
//! visible window of an in-flight reveal freeze with it and later continue
//! with their remaining duration intact.
//!
//! Deadlines are plain values inside [`Stage`]; cancelling is replacing the
//! stage, so nothing can fire into a later round.

use crate::rng::RevealPicker;
use crate::tiles::{TileIds, TileSet};
use crate::types::{DifficultyProfile, TileId, TileKind, REWARD_PROBABILITY};

/// An in-flight reveal, in round-clock milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RevealTask {
    pub tile_id: TileId,
    pub kind: TileKind,
    pub revealed_at_ms: u64,
    pub expires_at_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Waiting { reveal_at_ms: u64 },
    Showing(RevealTask),
}

/// Outcome of a due deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerEvent {
    /// A hidden tile was revealed (already marked on the tile set).
    Revealed(RevealTask),
    /// The visible window closed without a tap. The tile is still revealed;
    /// the caller accounts for the miss and hides it.
    Expired(RevealTask),
    /// No hidden tile was available; a new wait started.
    Skipped { at_ms: u64 },
}

#[derive(Debug, Clone)]
pub struct RevealScheduler<P> {
    picker: P,
    profile: DifficultyProfile,
    reward_probability: f32,
    stage: Stage,
    hidden: TileIds,
}

impl<P: RevealPicker> RevealScheduler<P> {
    pub fn new(picker: P, profile: DifficultyProfile) -> Self {
        Self {
            picker,
            profile,
            reward_probability: REWARD_PROBABILITY,
            stage: Stage::Idle,
            hidden: TileIds::new(),
        }
    }

    pub fn with_reward_probability(mut self, p: f32) -> Self {
        self.reward_probability = p.clamp(0.0, 1.0);
        self
    }

    pub fn picker_mut(&mut self) -> &mut P {
        &mut self.picker
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    /// Start the first wait at clock time `now_ms` using `profile`.
    pub fn begin(&mut self, now_ms: u64, profile: DifficultyProfile) {
        self.profile = profile;
        self.wait_from(now_ms);
    }

    /// Drop any wait or in-flight reveal.
    pub fn cancel(&mut self) {
        self.stage = Stage::Idle;
    }

    pub fn is_active(&self) -> bool {
        self.stage != Stage::Idle
    }

    pub fn in_flight(&self) -> Option<&RevealTask> {
        match &self.stage {
            Stage::Showing(task) => Some(task),
            _ => None,
        }
    }

    /// Clock time of the next deadline (reveal or expiry), if any.
    pub fn next_deadline_ms(&self) -> Option<u64> {
        match self.stage {
            Stage::Idle => None,
            Stage::Waiting { reveal_at_ms } => Some(reveal_at_ms),
            Stage::Showing(task) => Some(task.expires_at_ms),
        }
    }

    /// Process at most one deadline that is due at clock time `now_ms`.
    ///
    /// Call repeatedly until it returns `None` to catch up after a long gap.
    pub fn poll(&mut self, now_ms: u64, tiles: &mut TileSet) -> Option<SchedulerEvent> {
        match self.stage {
            Stage::Idle => None,
            Stage::Waiting { reveal_at_ms } if now_ms >= reveal_at_ms => {
                Some(self.reveal(reveal_at_ms, tiles))
            }
            Stage::Showing(task) if now_ms >= task.expires_at_ms => {
                self.wait_from(task.expires_at_ms);
                Some(SchedulerEvent::Expired(task))
            }
            _ => None,
        }
    }

    /// A tap resolved the in-flight reveal at clock time `now_ms`.
    ///
    /// Cancels the pending expiry and starts the next wait. Returns `None`
    /// if `tile_id` is not the in-flight tile.
    pub fn resolve(&mut self, tile_id: TileId, now_ms: u64) -> Option<RevealTask> {
        match self.stage {
            Stage::Showing(task) if task.tile_id == tile_id => {
                self.wait_from(now_ms);
                Some(task)
            }
            _ => None,
        }
    }

    fn reveal(&mut self, at_ms: u64, tiles: &mut TileSet) -> SchedulerEvent {
        tiles.hidden_ids_into(&mut self.hidden);
        if self.hidden.is_empty() {
            self.wait_from(at_ms);
            return SchedulerEvent::Skipped { at_ms };
        }

        let tile_id = self.picker.pick_tile(&self.hidden);
        let kind = self.picker.pick_kind(self.reward_probability);
        tiles.reveal(tile_id, kind);

        let task = RevealTask {
            tile_id,
            kind,
            revealed_at_ms: at_ms,
            expires_at_ms: at_ms + self.profile.visible_duration_ms.max(1) as u64,
        };
        self.stage = Stage::Showing(task);
        SchedulerEvent::Revealed(task)
    }

    fn wait_from(&mut self, from_ms: u64) {
        let wait = self.picker.interval_ms(&self.profile).max(1) as u64;
        self.stage = Stage::Waiting {
            reveal_at_ms: from_ms + wait,
        };
    }
}
