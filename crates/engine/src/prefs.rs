//! Rules-dialog preferences
//!
//! Persisted as a small JSON file next to the match history.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RulesPrefs {
    #[serde(default)]
    pub show_rules_on_startup: bool,
    #[serde(default)]
    pub rules_shown_once: bool,
}

impl RulesPrefs {
    /// Rules are shown on first launch and whenever the player opted in.
    pub fn should_show_rules(&self) -> bool {
        self.show_rules_on_startup || !self.rules_shown_once
    }

    /// The player closed the rules dialog.
    pub fn dismiss(&mut self, show_on_startup: bool) {
        self.show_rules_on_startup = show_on_startup;
        self.rules_shown_once = true;
    }
}

#[derive(Debug, Clone)]
pub struct PrefsStore {
    path: PathBuf,
}

impl PrefsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load preferences; a missing or unreadable file yields defaults.
    pub fn load(&self) -> RulesPrefs {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return RulesPrefs::default(),
        };
        match serde_json::from_str(&raw) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!("Ignoring corrupt preferences {}: {}", self.path.display(), e);
                RulesPrefs::default()
            }
        }
    }

    pub fn save(&self, prefs: &RulesPrefs) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(prefs)?)?;
        Ok(())
    }
}
