//! RNG module - randomness behind reveals
//!
//! Every random decision of the reveal scheduler goes through [`RevealPicker`]:
//! the wait before a reveal, which hidden tile to reveal, and what it shows.
//!
//! - [`RandomPicker`]: seeded PCG generator, reproducible for a given seed
//! - [`ScriptedPicker`]: replays planned decisions (tutorials, replays, tests)

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::types::{DifficultyProfile, TileId, TileKind};

/// Source of reveal decisions.
pub trait RevealPicker {
    /// Wait before the next reveal, within the profile's inclusive interval range.
    fn interval_ms(&mut self, profile: &DifficultyProfile) -> u32;

    /// Pick one of `hidden` (never empty when called).
    fn pick_tile(&mut self, hidden: &[TileId]) -> TileId;

    /// Symbol for the revealed tile.
    fn pick_kind(&mut self, reward_probability: f32) -> TileKind;
}

/// Uniform random picker on a seeded PCG stream.
#[derive(Debug, Clone)]
pub struct RandomPicker {
    rng: Pcg32,
    seed: u64,
}

impl RandomPicker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RevealPicker for RandomPicker {
    fn interval_ms(&mut self, profile: &DifficultyProfile) -> u32 {
        let lo = profile.reveal_interval_min_ms;
        let hi = profile.reveal_interval_max_ms.max(lo);
        self.rng.random_range(lo..=hi)
    }

    fn pick_tile(&mut self, hidden: &[TileId]) -> TileId {
        hidden[self.rng.random_range(0..hidden.len())]
    }

    fn pick_kind(&mut self, reward_probability: f32) -> TileKind {
        if self.rng.random_bool(reward_probability.clamp(0.0, 1.0) as f64) {
            TileKind::Reward
        } else {
            TileKind::Hazard
        }
    }
}

/// One planned reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedReveal {
    /// Wait before this reveal; `None` uses the profile minimum.
    pub wait_ms: Option<u32>,
    pub tile: TileId,
    pub kind: TileKind,
}

impl PlannedReveal {
    pub fn new(tile: TileId, kind: TileKind) -> Self {
        Self {
            wait_ms: None,
            tile,
            kind,
        }
    }

    pub fn after(mut self, wait_ms: u32) -> Self {
        self.wait_ms = Some(wait_ms);
        self
    }
}

/// Replays a fixed plan of reveals.
///
/// Once the plan runs out it keeps revealing rewards on the first hidden tile
/// at the profile's minimum interval. A planned tile that is not hidden falls
/// back to the first hidden one.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPicker {
    waits: VecDeque<Option<u32>>,
    picks: VecDeque<(TileId, TileKind)>,
}

impl ScriptedPicker {
    pub fn new(plan: impl IntoIterator<Item = PlannedReveal>) -> Self {
        let mut picker = Self::default();
        for step in plan {
            picker.push(step);
        }
        picker
    }

    pub fn push(&mut self, step: PlannedReveal) {
        self.waits.push_back(step.wait_ms);
        self.picks.push_back((step.tile, step.kind));
    }

    pub fn remaining(&self) -> usize {
        self.picks.len()
    }
}

impl RevealPicker for ScriptedPicker {
    fn interval_ms(&mut self, profile: &DifficultyProfile) -> u32 {
        self.waits
            .pop_front()
            .flatten()
            .unwrap_or(profile.reveal_interval_min_ms)
    }

    fn pick_tile(&mut self, hidden: &[TileId]) -> TileId {
        match self.picks.front() {
            Some(&(tile, _)) if hidden.contains(&tile) => tile,
            _ => hidden[0],
        }
    }

    fn pick_kind(&mut self, _reward_probability: f32) -> TileKind {
        self.picks
            .pop_front()
            .map(|(_, kind)| kind)
            .unwrap_or(TileKind::Reward)
    }
}
