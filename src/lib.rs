//! Tile Reflex (workspace facade crate).
//!
//! Re-exports the workspace crates as `tile_reflex::{core,adapter,term,input,engine,types}`
//! so the binary, integration tests and benches share one import root.

pub use tile_reflex_adapter as adapter;
pub use tile_reflex_core as core;
pub use tile_reflex_engine as engine;
pub use tile_reflex_input as input;
pub use tile_reflex_term as term;
pub use tile_reflex_types as types;
