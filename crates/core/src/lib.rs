//! Core round logic - pure, deterministic, and testable
//!
//! This crate contains every game rule of a reflex-tile round: which tile is
//! revealed when, what a tap or a missed reward costs, and how paused time is
//! accounted. It has **no dependencies** on terminals, networking, or async
//! runtimes, which makes it:
//!
//! - **Deterministic**: a seeded picker and a manual time source replay a round exactly
//! - **Testable**: every rule is exercised without real time passing
//! - **Portable**: the same state machine backs the terminal game, the async
//!   runtime, and the remote adapter
//!
//! # Module Structure
//!
//! - [`tiles`]: fixed-size tile set
//! - [`clock`]: round clock with pause/resume accounting and time sources
//! - [`rng`]: reveal decisions (seeded random or scripted)
//! - [`scheduler`]: wait / reveal / expire cycle on round-clock time
//! - [`coordinator`]: the round state machine (score, lives, misses, phases)
//! - [`result`]: end-of-round match summary
//! - [`snapshot`]: observable round state
//!
//! # Rules
//!
//! - Tapping a revealed **reward** scores a point and clears the miss counter
//! - Tapping a revealed **hazard** costs a life
//! - Letting `miss_threshold` rewards in a row expire costs a life
//! - A hazard that expires untouched costs nothing
//! - A non-fatal life loss triggers a short penalty pause; the last life ends the round
//!
//! # Example
//!
//! ```
//! use tile_reflex_core::{ManualTime, PlannedReveal, RoundConfig, RoundCoordinator, ScriptedPicker};
//! use tile_reflex_types::{Phase, TileKind};
//!
//! let time = ManualTime::new();
//! let picker = ScriptedPicker::new([PlannedReveal::new(3, TileKind::Reward).after(500)]);
//! let mut round = RoundCoordinator::with_picker(RoundConfig::default(), time.clone(), picker);
//!
//! round.start();
//! time.advance(500);
//! round.tick();
//! assert!(round.tiles().is_revealed(3));
//!
//! round.tap(3);
//! assert_eq!(round.score(), 1);
//! assert_eq!(round.phase(), Phase::Playing);
//! ```

pub mod clock;
pub mod config;
pub mod coordinator;
pub mod result;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod tiles;

pub use tile_reflex_types as types;

// Re-export commonly used types for convenience
pub use clock::{ManualTime, MonotonicTime, RoundClock, TimeSource};
pub use config::RoundConfig;
pub use coordinator::{RoundCoordinator, RoundEvent};
pub use result::{MatchResult, TapStats};
pub use rng::{PlannedReveal, RandomPicker, RevealPicker, ScriptedPicker};
pub use scheduler::{RevealScheduler, RevealTask, SchedulerEvent};
pub use snapshot::RoundSnapshot;
pub use tiles::{Tile, TileSet};
