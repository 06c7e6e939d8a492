//! Round coordinator - the round state machine
//!
//! This module ties together the tile set, the round clock and the reveal
//! scheduler, and owns score, lives and the consecutive-miss counter.
//!
//! # Serialization
//!
//! The coordinator is a plain `&mut self` state machine: whoever owns it is
//! the single writer. Every public entry point first processes deadlines that
//! are already due (penalty cooldown end, reveals, expiries) in time order, and
//! only then applies its own input. A tap and an expiry of the same tile are
//! therefore mutually exclusive: whichever comes first in time wins and the
//! other finds nothing to resolve.
//!
//! # Time
//!
//! Reveal deadlines are kept in round-clock time, which does not advance while
//! paused. The penalty cooldown is kept in monotonic time, since the round clock
//! is stopped while it runs. Transitions caused by a deadline are applied as of
//! the deadline, not as of the moment it is noticed, so a coarse tick or a long
//! gap between calls gives the same result as a fine one.

use crate::clock::{RoundClock, TimeSource};
use crate::config::RoundConfig;
use crate::result::{MatchResult, TapStats};
use crate::rng::{RandomPicker, RevealPicker};
use crate::scheduler::{RevealScheduler, RevealTask, SchedulerEvent};
use crate::snapshot::RoundSnapshot;
use crate::tiles::TileSet;
use crate::types::{
    Difficulty, DifficultyProfile, PauseReason, Phase, RoundCommand, TileId, TileKind,
};

/// Notification emitted by the coordinator (consumed by observers).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    PhaseChanged { from: Phase, to: Phase },
    TileRevealed(RevealTask),
    TileHidden {
        tile_id: TileId,
        kind: TileKind,
        tapped: bool,
    },
    RewardTapped { tile_id: TileId, reflex_ms: u64 },
    HazardTapped { tile_id: TileId },
    RewardMissed {
        tile_id: TileId,
        consecutive_misses: u32,
    },
    LifeLost { lives_left: u32 },
    /// Emitted exactly once per round, on `Playing -> Over`.
    MatchComplete(MatchResult),
}

pub struct RoundCoordinator<T, P = RandomPicker> {
    config: RoundConfig,
    difficulty: Difficulty,
    tiles: TileSet,
    clock: RoundClock<T>,
    scheduler: RevealScheduler<P>,
    phase: Phase,
    score: u32,
    lives: u32,
    consecutive_misses: u32,
    /// Monotonic time at which the current penalty pause ends.
    penalty_until_ms: Option<u64>,
    stats: TapStats,
    events: Vec<RoundEvent>,
}

impl<T: TimeSource> RoundCoordinator<T, RandomPicker> {
    /// Create a coordinator with a random picker seeded from `config.seed`
    /// (or from entropy when unset).
    pub fn new(config: RoundConfig, time: T) -> Self {
        let picker = match config.seed {
            Some(seed) => RandomPicker::new(seed),
            None => RandomPicker::from_entropy(),
        };
        Self::with_picker(config, time, picker)
    }
}

impl<T: TimeSource, P: RevealPicker> RoundCoordinator<T, P> {
    pub fn with_picker(config: RoundConfig, time: T, picker: P) -> Self {
        let config = config.sanitized();
        let difficulty = Difficulty::default();

        Self {
            difficulty,
            tiles: TileSet::new(config.tile_count),
            clock: RoundClock::new(time),
            scheduler: RevealScheduler::new(picker, *difficulty.profile())
                .with_reward_probability(config.reward_probability),
            phase: Phase::Ready,
            score: 0,
            lives: config.starting_lives,
            consecutive_misses: 0,
            penalty_until_ms: None,
            stats: TapStats::default(),
            events: Vec::new(),
            config,
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn consecutive_misses(&self) -> u32 {
        self.consecutive_misses
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn profile(&self) -> &'static DifficultyProfile {
        self.difficulty.profile()
    }

    pub fn tiles(&self) -> &TileSet {
        &self.tiles
    }

    pub fn stats(&self) -> &TapStats {
        &self.stats
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.clock.elapsed_ms()
    }

    pub fn in_flight(&self) -> Option<&RevealTask> {
        self.scheduler.in_flight()
    }

    /// Time left in the current penalty pause.
    pub fn penalty_remaining_ms(&self) -> Option<u64> {
        self.penalty_until_ms
            .map(|until| until.saturating_sub(self.clock.now_ms()))
    }

    pub fn scheduler_mut(&mut self) -> &mut RevealScheduler<P> {
        &mut self.scheduler
    }

    pub fn snapshot_into(&self, out: &mut RoundSnapshot) {
        out.tiles.clear();
        out.tiles.extend(self.tiles.iter().copied());
        out.score = self.score;
        out.lives = self.lives;
        out.phase = self.phase;
        out.elapsed_ms = self.clock.elapsed_ms();
        out.difficulty = self.difficulty;
        out.consecutive_misses = self.consecutive_misses;
    }

    pub fn snapshot(&self) -> RoundSnapshot {
        let mut s = RoundSnapshot::default();
        self.snapshot_into(&mut s);
        s
    }

    /// Take all events emitted since the last drain.
    pub fn drain_events(&mut self) -> std::vec::Drain<'_, RoundEvent> {
        self.events.drain(..)
    }

    /// Apply a command.
    pub fn apply(&mut self, command: RoundCommand) {
        match command {
            RoundCommand::Start => self.start(),
            RoundCommand::Pause => self.pause(),
            RoundCommand::Resume => self.resume(),
            RoundCommand::Reset => self.reset(),
            RoundCommand::SetDifficulty(difficulty) => {
                self.set_difficulty(difficulty);
            }
            RoundCommand::Tap(tile_id) => self.tap(tile_id),
        }
    }

    /// Select a difficulty. Only honoured in `Ready`; returns whether it was applied.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        self.difficulty = difficulty;
        true
    }

    /// `Ready -> Playing`. No-op in any other phase.
    pub fn start(&mut self) {
        if self.phase != Phase::Ready {
            return;
        }

        self.clear_round();
        self.clock.start();
        self.scheduler.begin(0, *self.difficulty.profile());
        self.set_phase(Phase::Playing);
    }

    /// Abandon the round from any phase and return to `Ready`.
    ///
    /// Never emits a match result.
    pub fn reset(&mut self) {
        self.clock.reset();
        self.scheduler.cancel();
        self.clear_round();
        self.set_phase(Phase::Ready);
    }

    /// Manual pause. Only from `Playing`; idempotent.
    pub fn pause(&mut self) {
        self.advance();
        if self.phase != Phase::Playing {
            return;
        }
        self.clock.pause();
        self.set_phase(Phase::Paused(PauseReason::Manual));
    }

    /// End a manual pause. A penalty pause cannot be cut short.
    pub fn resume(&mut self) {
        self.advance();
        if self.phase != Phase::Paused(PauseReason::Manual) {
            return;
        }
        self.clock.resume();
        self.set_phase(Phase::Playing);
    }

    /// Process every deadline due by now.
    pub fn tick(&mut self) {
        self.advance();
    }

    /// Player tap. Silently ignored unless `Playing` and the tile is revealed.
    pub fn tap(&mut self, tile_id: TileId) {
        self.advance();
        if self.phase != Phase::Playing || !self.tiles.is_revealed(tile_id) {
            return;
        }

        let at_ms = self.clock.elapsed_ms();
        let task = self.scheduler.resolve(tile_id, at_ms);
        let Some(tile) = self.tiles.hide(tile_id) else {
            return;
        };
        self.events.push(RoundEvent::TileHidden {
            tile_id,
            kind: tile.kind,
            tapped: true,
        });

        match tile.kind {
            TileKind::Reward => {
                let reflex_ms = task
                    .map(|t| at_ms.saturating_sub(t.revealed_at_ms))
                    .unwrap_or(0);
                self.score += 1;
                self.consecutive_misses = 0;
                self.stats.record_reward(reflex_ms);
                self.events
                    .push(RoundEvent::RewardTapped { tile_id, reflex_ms });
            }
            TileKind::Hazard => {
                self.stats.record_hazard();
                self.events.push(RoundEvent::HazardTapped { tile_id });
                self.lose_life(at_ms);
            }
            TileKind::None => {}
        }
    }

    fn advance(&mut self) {
        loop {
            match self.phase {
                Phase::Playing => {
                    let now = self.clock.elapsed_ms();
                    let Some(event) = self.scheduler.poll(now, &mut self.tiles) else {
                        return;
                    };
                    self.on_scheduler_event(event);
                }
                Phase::Paused(PauseReason::Penalty) => {
                    let Some(until) = self.penalty_until_ms else {
                        return;
                    };
                    if self.clock.now_ms() < until {
                        return;
                    }
                    self.end_penalty(until);
                }
                _ => return,
            }
        }
    }

    fn on_scheduler_event(&mut self, event: SchedulerEvent) {
        match event {
            SchedulerEvent::Revealed(task) => self.events.push(RoundEvent::TileRevealed(task)),
            SchedulerEvent::Expired(task) => self.on_expired(task),
            SchedulerEvent::Skipped { .. } => {}
        }
    }

    fn on_expired(&mut self, task: RevealTask) {
        // Hazards that simply vanish are not penalized.
        if task.kind == TileKind::Reward {
            self.consecutive_misses += 1;
            self.stats.record_miss();
            self.events.push(RoundEvent::RewardMissed {
                tile_id: task.tile_id,
                consecutive_misses: self.consecutive_misses,
            });

            if self.consecutive_misses >= self.profile().miss_threshold {
                self.lose_life(task.expires_at_ms);
            }
        }

        if let Some(tile) = self.tiles.hide(task.tile_id) {
            self.events.push(RoundEvent::TileHidden {
                tile_id: tile.id,
                kind: tile.kind,
                tapped: false,
            });
        }
    }

    /// Lose a life at round-clock time `at_ms`. Every loss clears the miss counter.
    fn lose_life(&mut self, at_ms: u64) {
        self.lives = self.lives.saturating_sub(1);
        self.consecutive_misses = 0;
        self.events.push(RoundEvent::LifeLost {
            lives_left: self.lives,
        });

        let at_mono = self.clock.instant_of(at_ms);
        if self.lives == 0 {
            self.finish(at_mono);
        } else {
            self.clock.pause_at(at_mono);
            self.penalty_until_ms = Some(at_mono + self.profile().penalty_cooldown_ms as u64);
            self.set_phase(Phase::Paused(PauseReason::Penalty));
        }
    }

    fn end_penalty(&mut self, until_ms: u64) {
        self.penalty_until_ms = None;
        self.clock.resume_at(until_ms);
        self.set_phase(Phase::Playing);
    }

    fn finish(&mut self, at_mono: u64) {
        self.clock.pause_at(at_mono);
        self.scheduler.cancel();
        self.penalty_until_ms = None;
        self.set_phase(Phase::Over);

        let timestamp_ms = self.clock.time().epoch_ms();
        let result = MatchResult {
            id: format!("{}_{}", self.config.player_id, timestamp_ms),
            player_id: self.config.player_id.clone(),
            score: self.score,
            duration_ms: self.clock.elapsed_ms(),
            difficulty: self.difficulty.as_str().to_string(),
            timestamp_ms,
            correct_taps: self.stats.correct_taps,
            total_taps: self.stats.total_taps,
            total_reflex_time_ms: self.stats.total_reflex_time_ms,
            perfect_streak: self.stats.best_streak,
        };
        self.events.push(RoundEvent::MatchComplete(result));
    }

    fn clear_round(&mut self) {
        self.tiles.rebuild();
        self.score = 0;
        self.lives = self.config.starting_lives;
        self.consecutive_misses = 0;
        self.penalty_until_ms = None;
        self.stats = TapStats::default();
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        if from != to {
            self.phase = to;
            self.events.push(RoundEvent::PhaseChanged { from, to });
        }
    }
}
