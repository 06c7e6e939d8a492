//! Terminal input.
//!
//! Maps `crossterm` key events into [`InputAction`]s and resolves them into
//! [`crate::types::RoundCommand`]s against the current phase. Independent of
//! any UI framework.

pub mod map;

pub use tile_reflex_types as types;

pub use map::{
    handle_key_event, handle_rules_key, key_for_tile, should_quit, tile_for_key, InputAction,
    RulesKey,
};
pub use tile_reflex_types::TILE_KEYS;
