//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the workspace.
//! All types are pure data with no external dependencies, so they can be used
//! from the round logic, the terminal front-end and the remote adapter alike.
//!
//! # Board
//!
//! A round is played on a fixed set of tiles, 16 by default (a 4x4 grid).
//! Tile ids are dense: `0..tile_count`.
//!
//! # Difficulty tiers
//!
//! All timing values are in milliseconds:
//!
//! | Tier | Reveal interval | Visible | Miss threshold | Penalty cooldown |
//! |------|-----------------|---------|----------------|------------------|
//! | EASY | 600-1200 | 1200 | 2 | 1000 |
//! | NORMAL | 400-800 | 1000 | 2 | 1000 |
//! | HARD | 200-400 | 800 | 3 | 500 |
//!
//! # Examples
//!
//! ```
//! use tile_reflex_types::{Difficulty, Phase, PauseReason, TileKind};
//!
//! let diff = Difficulty::from_str("hard").unwrap();
//! assert_eq!(diff.profile().visible_duration_ms, 800);
//! assert_eq!(diff.profile().miss_threshold, 3);
//!
//! assert_eq!(TileKind::from_str("reward"), Some(TileKind::Reward));
//! assert!(Phase::Paused(PauseReason::Penalty).is_paused());
//! ```

/// Default number of tiles in a round (4x4 grid).
pub const DEFAULT_TILE_COUNT: u8 = 16;

/// Upper bound on tiles per round (6x6 grid).
pub const MAX_TILES: usize = 36;

/// Lives granted at round start.
pub const STARTING_LIVES: u32 = 3;

/// Chance that a reveal shows a reward rather than a hazard.
pub const REWARD_PROBABILITY: f32 = 0.7;

/// Fixed runtime tick interval in milliseconds (16ms ≈ 60 FPS).
pub const TICK_MS: u32 = 16;

/// Default number of entries returned by top-score queries.
pub const TOP_SCORES_LIMIT: usize = 5;

/// Player id used when no player is configured.
pub const ANONYMOUS_PLAYER: &str = "anonymous";

/// Tile identifier, unique within a round.
pub type TileId = u8;

/// Keyboard keys bound to the first 16 tiles, row-major over a 4x4 grid.
pub const TILE_KEYS: [char; 16] = [
    '1', '2', '3', '4', //
    'q', 'w', 'e', 'r', //
    'a', 's', 'd', 'f', //
    'z', 'x', 'c', 'v',
];

/// Symbol currently assigned to a tile.
///
/// - **None**: never revealed since the last rebuild
/// - **Reward**: tap it before it hides to score
/// - **Hazard**: tapping it costs a life
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TileKind {
    #[default]
    None,
    Reward,
    Hazard,
}

impl TileKind {
    /// Parse tile kind from string (case-insensitive)
    ///
    /// ```
    /// use tile_reflex_types::TileKind;
    ///
    /// assert_eq!(TileKind::from_str("HAZARD"), Some(TileKind::Hazard));
    /// assert_eq!(TileKind::from_str("coin"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(TileKind::None),
            "reward" => Some(TileKind::Reward),
            "hazard" => Some(TileKind::Hazard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TileKind::None => "none",
            TileKind::Reward => "reward",
            TileKind::Hazard => "hazard",
        }
    }
}

/// Timing and penalty policy for one difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DifficultyProfile {
    pub name: &'static str,
    /// Lower bound of the wait before the next reveal (inclusive).
    pub reveal_interval_min_ms: u32,
    /// Upper bound of the wait before the next reveal (inclusive).
    pub reveal_interval_max_ms: u32,
    /// How long a revealed tile stays tappable.
    pub visible_duration_ms: u32,
    /// Consecutive missed rewards that cost a life.
    pub miss_threshold: u32,
    /// Length of the automatic pause after a non-fatal life loss.
    pub penalty_cooldown_ms: u32,
}

const EASY_PROFILE: DifficultyProfile = DifficultyProfile {
    name: "EASY",
    reveal_interval_min_ms: 600,
    reveal_interval_max_ms: 1200,
    visible_duration_ms: 1200,
    miss_threshold: 2,
    penalty_cooldown_ms: 1000,
};

const NORMAL_PROFILE: DifficultyProfile = DifficultyProfile {
    name: "NORMAL",
    reveal_interval_min_ms: 400,
    reveal_interval_max_ms: 800,
    visible_duration_ms: 1000,
    miss_threshold: 2,
    penalty_cooldown_ms: 1000,
};

const HARD_PROFILE: DifficultyProfile = DifficultyProfile {
    name: "HARD",
    reveal_interval_min_ms: 200,
    reveal_interval_max_ms: 400,
    visible_duration_ms: 800,
    miss_threshold: 3,
    penalty_cooldown_ms: 500,
};

/// Difficulty tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Parse difficulty from string (case-insensitive)
    ///
    /// ```
    /// use tile_reflex_types::Difficulty;
    ///
    /// assert_eq!(Difficulty::from_str("Easy"), Some(Difficulty::Easy));
    /// assert_eq!(Difficulty::from_str("NORMAL"), Some(Difficulty::Normal));
    /// assert_eq!(Difficulty::from_str("insane"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Upper-case tier name, as recorded in match results.
    pub fn as_str(&self) -> &'static str {
        self.profile().name
    }

    pub fn profile(&self) -> &'static DifficultyProfile {
        match self {
            Difficulty::Easy => &EASY_PROFILE,
            Difficulty::Normal => &NORMAL_PROFILE,
            Difficulty::Hard => &HARD_PROFILE,
        }
    }
}

/// Why a round is paused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseReason {
    /// Player asked for a pause; only `resume` ends it.
    Manual,
    /// Automatic breather after a non-fatal life loss; ends on its own.
    Penalty,
}

/// Round lifecycle phase.
///
/// `Ready -> Playing -> Paused <-> Playing -> Over`, plus `any -> Ready` on reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    #[default]
    Ready,
    Playing,
    Paused(PauseReason),
    Over,
}

impl Phase {
    pub fn is_playing(&self) -> bool {
        matches!(self, Phase::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Phase::Paused(_))
    }

    /// Lower-case phase name for wire protocols and the HUD.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Ready => "ready",
            Phase::Playing => "playing",
            Phase::Paused(PauseReason::Manual) => "paused",
            Phase::Paused(PauseReason::Penalty) => "penalty",
            Phase::Over => "over",
        }
    }
}

/// Commands accepted by the round coordinator.
///
/// Used by both terminal input and remote control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundCommand {
    /// Begin a round (only from Ready)
    Start,
    /// Manual pause (only while Playing)
    Pause,
    /// End a manual pause
    Resume,
    /// Abandon the round and return to Ready
    Reset,
    /// Pick a tier (only honoured in Ready)
    SetDifficulty(Difficulty),
    /// Tap a tile
    Tap(TileId),
}

impl RoundCommand {
    /// camelCase command name for remote protocols
    pub fn as_str(&self) -> &'static str {
        match self {
            RoundCommand::Start => "start",
            RoundCommand::Pause => "pause",
            RoundCommand::Resume => "resume",
            RoundCommand::Reset => "reset",
            RoundCommand::SetDifficulty(_) => "setDifficulty",
            RoundCommand::Tap(_) => "tap",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_tier_defaults() {
        let easy = Difficulty::Easy.profile();
        assert_eq!(
            (easy.reveal_interval_min_ms, easy.reveal_interval_max_ms),
            (600, 1200)
        );
        assert_eq!(easy.visible_duration_ms, 1200);
        assert_eq!(easy.miss_threshold, 2);
        assert_eq!(easy.penalty_cooldown_ms, 1000);

        let normal = Difficulty::Normal.profile();
        assert_eq!(
            (normal.reveal_interval_min_ms, normal.reveal_interval_max_ms),
            (400, 800)
        );
        assert_eq!(normal.visible_duration_ms, 1000);
        assert_eq!(normal.miss_threshold, 2);

        let hard = Difficulty::Hard.profile();
        assert_eq!(
            (hard.reveal_interval_min_ms, hard.reveal_interval_max_ms),
            (200, 400)
        );
        assert_eq!(hard.visible_duration_ms, 800);
        assert_eq!(hard.miss_threshold, 3);
        assert_eq!(hard.penalty_cooldown_ms, 500);
    }

    #[test]
    fn default_difficulty_is_normal() {
        assert_eq!(Difficulty::default(), Difficulty::Normal);
        assert_eq!(Difficulty::default().as_str(), "NORMAL");
    }

    #[test]
    fn phase_names() {
        assert_eq!(Phase::Ready.as_str(), "ready");
        assert_eq!(Phase::Paused(PauseReason::Manual).as_str(), "paused");
        assert_eq!(Phase::Paused(PauseReason::Penalty).as_str(), "penalty");
        assert!(!Phase::Over.is_playing());
        assert!(Phase::Playing.is_playing());
    }
}
