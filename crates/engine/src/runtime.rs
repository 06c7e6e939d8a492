//! Async runtime around the round coordinator.
//!
//! One tokio task owns the [`RoundCoordinator`]. Taps, lifecycle commands and
//! the periodic tick are messages handled one at a time by that task, so the
//! coordinator never needs a lock. Observers read published snapshots from a
//! `watch` channel; finished rounds fan out on a `broadcast` channel and to
//! the [`MatchSink`].

use std::sync::Arc;
use std::time::Duration;

use tile_reflex_core::{
    MatchResult, RandomPicker, RevealPicker, RoundCoordinator, RoundEvent, RoundSnapshot,
    TimeSource,
};
use tile_reflex_types::{Difficulty, RoundCommand, TileId};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::audio::{AudioCue, SilentAudio};
use crate::config::EngineConfig;
use crate::store::{MatchHistory, MatchSink};
use crate::time::TokioTime;

const RESULT_CHANNEL_CAPACITY: usize = 16;

/// External collaborators notified by the runtime.
#[derive(Clone)]
pub struct Collaborators {
    pub sink: Arc<dyn MatchSink>,
    pub audio: Arc<dyn AudioCue>,
}

impl Collaborators {
    pub fn new(sink: Arc<dyn MatchSink>, audio: Arc<dyn AudioCue>) -> Self {
        Self { sink, audio }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            sink: Arc::new(MatchHistory::new()),
            audio: Arc::new(SilentAudio),
        }
    }
}

#[derive(Debug)]
enum Message {
    Command(RoundCommand),
    Shutdown,
}

/// Cloneable handle to a running coordinator task.
///
/// Commands are fire-and-forget; they return `false` only once the task has
/// stopped.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::UnboundedSender<Message>,
    snapshots: watch::Receiver<RoundSnapshot>,
    results: broadcast::Sender<MatchResult>,
}

impl CoordinatorHandle {
    pub fn send(&self, command: RoundCommand) -> bool {
        self.tx.send(Message::Command(command)).is_ok()
    }

    pub fn start(&self) -> bool {
        self.send(RoundCommand::Start)
    }

    pub fn pause(&self) -> bool {
        self.send(RoundCommand::Pause)
    }

    pub fn resume(&self) -> bool {
        self.send(RoundCommand::Resume)
    }

    pub fn reset(&self) -> bool {
        self.send(RoundCommand::Reset)
    }

    pub fn set_difficulty(&self, difficulty: Difficulty) -> bool {
        self.send(RoundCommand::SetDifficulty(difficulty))
    }

    pub fn tap(&self, tile_id: TileId) -> bool {
        self.send(RoundCommand::Tap(tile_id))
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> RoundSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Stream of snapshots; a new value is published whenever the round changes.
    pub fn subscribe(&self) -> watch::Receiver<RoundSnapshot> {
        self.snapshots.clone()
    }

    /// Stream of finished rounds.
    pub fn match_results(&self) -> broadcast::Receiver<MatchResult> {
        self.results.subscribe()
    }

    /// Stop the coordinator task. Pending commands queued before this are still applied.
    pub fn shutdown(&self) {
        let _ = self.tx.send(Message::Shutdown);
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Spawn a coordinator driven by the tokio clock, configured from `config`.
pub fn spawn(
    config: &EngineConfig,
    collaborators: Collaborators,
) -> (CoordinatorHandle, JoinHandle<()>) {
    let coordinator: RoundCoordinator<TokioTime, RandomPicker> =
        RoundCoordinator::new(config.round.clone(), TokioTime::new());
    spawn_with(coordinator, collaborators, config.tick())
}

/// Spawn a task owning an already-built coordinator.
pub fn spawn_with<T, P>(
    coordinator: RoundCoordinator<T, P>,
    collaborators: Collaborators,
    tick: Duration,
) -> (CoordinatorHandle, JoinHandle<()>)
where
    T: TimeSource + 'static,
    P: RevealPicker + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(coordinator.snapshot());
    let (results_tx, _) = broadcast::channel(RESULT_CHANNEL_CAPACITY);

    let actor = Actor {
        coordinator,
        collaborators,
        snapshot_tx,
        results_tx: results_tx.clone(),
        scratch: RoundSnapshot::default(),
    };
    let task = tokio::spawn(actor.run(rx, tick.max(Duration::from_millis(1))));

    let handle = CoordinatorHandle {
        tx,
        snapshots: snapshot_rx,
        results: results_tx,
    };
    (handle, task)
}

struct Actor<T, P> {
    coordinator: RoundCoordinator<T, P>,
    collaborators: Collaborators,
    snapshot_tx: watch::Sender<RoundSnapshot>,
    results_tx: broadcast::Sender<MatchResult>,
    scratch: RoundSnapshot,
}

impl<T, P> Actor<T, P>
where
    T: TimeSource,
    P: RevealPicker,
{
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Message>, tick: Duration) {
        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Coordinator started (tick {}ms)", tick.as_millis());

        loop {
            tokio::select! {
                msg = rx.recv() => match msg {
                    Some(Message::Command(command)) => {
                        tracing::debug!("Command {}", command.as_str());
                        self.coordinator.apply(command);
                    }
                    Some(Message::Shutdown) | None => break,
                },
                _ = interval.tick() => self.coordinator.tick(),
            }

            self.dispatch_events();
            self.publish();
        }

        tracing::info!("Coordinator stopped");
    }

    fn dispatch_events(&mut self) {
        for event in self.coordinator.drain_events() {
            match event {
                RoundEvent::PhaseChanged { from, to } => {
                    tracing::info!("Phase {} -> {}", from.as_str(), to.as_str());
                }
                RoundEvent::TileRevealed(task) => {
                    tracing::debug!(
                        "Revealed tile {} ({}) until {}ms",
                        task.tile_id,
                        task.kind.as_str(),
                        task.expires_at_ms
                    );
                }
                RoundEvent::LifeLost { lives_left } => {
                    tracing::info!("Life lost, {} left", lives_left);
                    if lives_left > 0 {
                        self.collaborators.audio.hazard_hit();
                    }
                }
                RoundEvent::MatchComplete(result) => {
                    tracing::info!(
                        "Match complete: score {} in {}ms ({})",
                        result.score,
                        result.duration_ms,
                        result.difficulty
                    );
                    let _ = self.results_tx.send(result.clone());

                    let sink = Arc::clone(&self.collaborators.sink);
                    tokio::task::spawn_blocking(move || {
                        if let Err(e) = sink.on_match_complete(result) {
                            tracing::warn!("Failed to persist match result: {}", e);
                        }
                    });

                    self.collaborators.audio.game_over();
                }
                _ => {}
            }
        }
    }

    fn publish(&mut self) {
        let coordinator = &self.coordinator;
        let scratch = &mut self.scratch;
        self.snapshot_tx.send_if_modified(|current| {
            coordinator.snapshot_into(scratch);
            if *current == *scratch {
                false
            } else {
                std::mem::swap(current, scratch);
                true
            }
        });
    }
}
