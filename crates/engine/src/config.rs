//! Engine configuration from environment variables.

use std::path::PathBuf;
use std::time::Duration;

use tile_reflex_core::RoundConfig;
use tile_reflex_types::TICK_MS;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub round: RoundConfig,
    /// Coordinator tick interval.
    pub tick_ms: u32,
    /// JSON-lines match history; `None` keeps history in memory.
    pub history_path: Option<PathBuf>,
    /// Rules preferences file; `None` always shows rules.
    pub prefs_path: Option<PathBuf>,
    /// Log file; `None` disables logging.
    pub log_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            round: RoundConfig::default(),
            tick_ms: TICK_MS,
            history_path: None,
            prefs_path: None,
            log_path: None,
        }
    }
}

fn path_var(name: &str) -> Option<PathBuf> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

impl EngineConfig {
    /// Create from environment variables.
    ///
    /// Round settings come from [`RoundConfig::from_env`]; in addition:
    /// - `TILE_REFLEX_TICK_MS`: coordinator tick (1..=250, default 16)
    /// - `TILE_REFLEX_HISTORY`: match history file
    /// - `TILE_REFLEX_PREFS`: rules preferences file
    /// - `TILE_REFLEX_LOG_PATH`: log file
    pub fn from_env() -> Self {
        let tick_ms = std::env::var("TILE_REFLEX_TICK_MS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(TICK_MS)
            .clamp(1, 250);

        Self {
            round: RoundConfig::from_env(),
            tick_ms,
            history_path: path_var("TILE_REFLEX_HISTORY"),
            prefs_path: path_var("TILE_REFLEX_PREFS"),
            log_path: path_var("TILE_REFLEX_LOG_PATH"),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1) as u64)
    }
}
