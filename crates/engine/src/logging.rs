//! Tracing subscriber setup.
//!
//! The terminal front-end owns stdout/stderr, so logs only go to a file.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber appending to `path`.
///
/// Filtering follows `RUST_LOG` (default `info`). Returns false if a global
/// subscriber was already installed.
pub fn init_file_logging(path: &Path) -> std::io::Result<bool> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .is_ok();
    Ok(installed)
}
