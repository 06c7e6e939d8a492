//! Round configuration.

use crate::types::{
    ANONYMOUS_PLAYER, DEFAULT_TILE_COUNT, MAX_TILES, REWARD_PROBABILITY, STARTING_LIVES,
};

#[derive(Debug, Clone, PartialEq)]
pub struct RoundConfig {
    pub tile_count: u8,
    pub starting_lives: u32,
    pub reward_probability: f32,
    /// Reveal RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub player_id: String,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            tile_count: DEFAULT_TILE_COUNT,
            starting_lives: STARTING_LIVES,
            reward_probability: REWARD_PROBABILITY,
            seed: None,
            player_id: ANONYMOUS_PLAYER.to_string(),
        }
    }
}

impl RoundConfig {
    /// Create from environment variables, falling back to defaults.
    ///
    /// - `TILE_REFLEX_TILES`: tile count (1..=36)
    /// - `TILE_REFLEX_LIVES`: starting lives (>= 1)
    /// - `TILE_REFLEX_REWARD_P`: reward probability (0.0..=1.0)
    /// - `TILE_REFLEX_SEED`: reveal RNG seed
    /// - `TILE_REFLEX_PLAYER`: player id recorded in match results
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();

        let tile_count = env::var("TILE_REFLEX_TILES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.tile_count);

        let starting_lives = env::var("TILE_REFLEX_LIVES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.starting_lives);

        let reward_probability = env::var("TILE_REFLEX_REWARD_P")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.reward_probability);

        let seed = env::var("TILE_REFLEX_SEED")
            .ok()
            .and_then(|s| s.parse().ok());

        let player_id = env::var("TILE_REFLEX_PLAYER")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.player_id);

        Self {
            tile_count,
            starting_lives,
            reward_probability,
            seed,
            player_id,
        }
        .sanitized()
    }

    /// Clamp every field into its valid range.
    pub fn sanitized(mut self) -> Self {
        self.tile_count = self.tile_count.clamp(1, MAX_TILES as u8);
        self.starting_lives = self.starting_lives.max(1);
        self.reward_probability = if self.reward_probability.is_finite() {
            self.reward_probability.clamp(0.0, 1.0)
        } else {
            REWARD_PROBABILITY
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RoundConfig::default();
        assert_eq!(config.tile_count, 16);
        assert_eq!(config.starting_lives, 3);
        assert!((config.reward_probability - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.player_id, "anonymous");
    }

    #[test]
    fn sanitize_clamps() {
        let config = RoundConfig {
            tile_count: 0,
            starting_lives: 0,
            reward_probability: f32::NAN,
            ..RoundConfig::default()
        }
        .sanitized();
        assert_eq!(config.tile_count, 1);
        assert_eq!(config.starting_lives, 1);
        assert!((config.reward_probability - 0.7).abs() < f32::EPSILON);

        let config = RoundConfig {
            tile_count: 99,
            reward_probability: 3.0,
            ..RoundConfig::default()
        }
        .sanitized();
        assert_eq!(config.tile_count, 36);
        assert_eq!(config.reward_probability, 1.0);
    }
}
