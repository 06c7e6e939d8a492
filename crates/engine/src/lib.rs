//! Engine: runs the round coordinator on tokio and connects it to the outside world.
//!
//! - [`runtime`]: single-writer coordinator task with a cloneable command handle
//! - [`store`]: match history (`MatchSink`, in-memory and JSON-lines stores)
//! - [`prefs`]: rules-dialog preferences
//! - [`audio`]: audio cue collaborator
//! - [`config`]: environment-driven engine configuration
//! - [`logging`]: file-backed tracing subscriber

pub mod audio;
pub mod config;
pub mod error;
pub mod logging;
pub mod prefs;
pub mod runtime;
pub mod store;
pub mod time;

pub use tile_reflex_core as core;
pub use tile_reflex_types as types;

pub use audio::{AudioCue, SilentAudio};
pub use config::EngineConfig;
pub use error::{Result, StoreError};
pub use logging::init_file_logging;
pub use prefs::{PrefsStore, RulesPrefs};
pub use runtime::{spawn, spawn_with, Collaborators, CoordinatorHandle};
pub use store::{rank_top_scores, JsonlMatchStore, MatchHistory, MatchSink};
pub use time::TokioTime;
