//! Terminal rendering for the tile grid.
//!
//! Rendering goes through a small framebuffer rather than a widget toolkit:
//! [`GridView`] draws a round snapshot into a [`FrameBuffer`] (pure, testable),
//! and [`TerminalRenderer`] flushes frames to the terminal with crossterm,
//! emitting only the cells that changed.

pub mod fb;
pub mod grid_view;
pub mod renderer;

pub use tile_reflex_core as core;
pub use tile_reflex_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use grid_view::{grid_columns, GridView, Panel, Viewport, RULES};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
