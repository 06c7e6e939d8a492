//! Audio cue collaborator.
//!
//! Cues are best effort: implementations must return quickly and never fail.

pub trait AudioCue: Send + Sync {
    /// A life was lost but the round goes on (hazard tap or too many misses).
    fn hazard_hit(&self);

    /// The round ended.
    fn game_over(&self);
}

/// Plays nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudio;

impl AudioCue for SilentAudio {
    fn hazard_hit(&self) {}

    fn game_over(&self) {}
}
