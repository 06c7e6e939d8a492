use arrayvec::ArrayVec;

use crate::tiles::Tile;
use crate::types::{Difficulty, Phase, MAX_TILES};

/// Observable round state, published after every transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoundSnapshot {
    pub tiles: ArrayVec<Tile, MAX_TILES>,
    pub score: u32,
    pub lives: u32,
    pub phase: Phase,
    pub elapsed_ms: u64,
    pub difficulty: Difficulty,
    pub consecutive_misses: u32,
}

impl RoundSnapshot {
    pub fn clear(&mut self) {
        self.tiles.clear();
        self.score = 0;
        self.lives = 0;
        self.phase = Phase::Ready;
        self.elapsed_ms = 0;
        self.difficulty = Difficulty::default();
        self.consecutive_misses = 0;
    }

    pub fn playable(&self) -> bool {
        self.phase.is_playing()
    }

    pub fn revealed(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter().filter(|t| t.revealed)
    }
}

impl Default for RoundSnapshot {
    fn default() -> Self {
        Self {
            tiles: ArrayVec::new(),
            score: 0,
            lives: 0,
            phase: Phase::Ready,
            elapsed_ms: 0,
            difficulty: Difficulty::default(),
            consecutive_misses: 0,
        }
    }
}
