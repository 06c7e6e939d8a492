//! Coordinator task tests on a paused tokio clock.

use std::sync::Arc;
use std::time::Duration;

use tile_reflex::core::{PlannedReveal, RoundConfig, RoundCoordinator, ScriptedPicker};
use tile_reflex::engine::{
    spawn_with, Collaborators, CoordinatorHandle, JsonlMatchStore, MatchSink, SilentAudio,
    TokioTime,
};
use tile_reflex::types::{Difficulty, PauseReason, Phase, TileKind};
use tokio::task::JoinHandle;

fn spawn_scripted(
    plan: Vec<PlannedReveal>,
    config: RoundConfig,
    collaborators: Collaborators,
) -> (CoordinatorHandle, JoinHandle<()>) {
    let coordinator =
        RoundCoordinator::with_picker(config, TokioTime::new(), ScriptedPicker::new(plan));
    spawn_with(coordinator, collaborators, Duration::from_millis(16))
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn test_penalty_pause_ends_on_its_own() {
    let plan = vec![
        PlannedReveal::new(5, TileKind::Hazard).after(100),
        PlannedReveal::new(6, TileKind::Reward).after(60_000),
    ];
    let (handle, task) = spawn_scripted(plan, RoundConfig::default(), Collaborators::default());

    handle.start();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(handle.snapshot().tiles[5].revealed);

    handle.tap(5);
    settle().await;
    let snap = handle.snapshot();
    assert_eq!(snap.lives, 2);
    assert_eq!(snap.phase, Phase::Paused(PauseReason::Penalty));
    assert!(!snap.playable());

    // Taps during the penalty are ignored.
    handle.tap(5);
    handle.resume();
    settle().await;
    assert_eq!(handle.snapshot().phase, Phase::Paused(PauseReason::Penalty));

    tokio::time::sleep(Duration::from_millis(1100)).await;
    let snap = handle.snapshot();
    assert_eq!(snap.phase, Phase::Playing);
    assert_eq!(snap.lives, 2);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_manual_pause_freezes_elapsed_time() {
    let plan = vec![PlannedReveal::new(0, TileKind::Reward).after(60_000)];
    let (handle, task) = spawn_scripted(plan, RoundConfig::default(), Collaborators::default());

    handle.start();
    tokio::time::sleep(Duration::from_millis(500)).await;
    handle.pause();
    settle().await;
    let paused_at = handle.snapshot().elapsed_ms;
    assert_eq!(handle.snapshot().phase, Phase::Paused(PauseReason::Manual));

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(handle.snapshot().elapsed_ms, paused_at);

    handle.resume();
    tokio::time::sleep(Duration::from_millis(500)).await;
    let snap = handle.snapshot();
    assert_eq!(snap.phase, Phase::Playing);
    assert!(snap.elapsed_ms >= paused_at + 480);
    assert!(snap.elapsed_ms < paused_at + 2000);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_difficulty_only_changes_before_start() {
    let (handle, task) = spawn_scripted(vec![], RoundConfig::default(), Collaborators::default());

    handle.set_difficulty(Difficulty::Hard);
    settle().await;
    assert_eq!(handle.snapshot().difficulty, Difficulty::Hard);

    handle.start();
    handle.set_difficulty(Difficulty::Easy);
    settle().await;
    assert_eq!(handle.snapshot().difficulty, Difficulty::Hard);

    handle.reset();
    handle.set_difficulty(Difficulty::Easy);
    settle().await;
    let snap = handle.snapshot();
    assert_eq!(snap.phase, Phase::Ready);
    assert_eq!(snap.difficulty, Difficulty::Easy);

    handle.shutdown();
    task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_finished_round_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history").join("matches.jsonl");
    let store = Arc::new(JsonlMatchStore::open(&path).unwrap());
    let sink: Arc<dyn MatchSink> = store.clone();

    let config = RoundConfig {
        starting_lives: 1,
        player_id: "alice".to_string(),
        ..RoundConfig::default()
    };
    let plan = vec![
        PlannedReveal::new(2, TileKind::Reward).after(100),
        PlannedReveal::new(3, TileKind::Hazard).after(100),
    ];
    let (handle, task) = spawn_scripted(plan, config, Collaborators::new(sink, Arc::new(SilentAudio)));
    let mut results = handle.match_results();

    handle.start();
    tokio::time::sleep(Duration::from_millis(120)).await;
    handle.tap(2);
    tokio::time::sleep(Duration::from_millis(120)).await;
    handle.tap(3);

    let result = results.recv().await.unwrap();
    assert_eq!(result.score, 1);
    assert_eq!(result.player_id, "alice");
    assert_eq!(result.correct_taps, 1);

    for _ in 0..200 {
        if store.len() == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(1)).await;
    }
    assert_eq!(store.len(), 1);

    handle.shutdown();
    task.await.unwrap();

    let reopened = JsonlMatchStore::open(&path).unwrap();
    let best = reopened.top_scores("alice", 5);
    assert_eq!(best, vec![result]);
    assert!(reopened.top_scores("bob", 5).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reset_abandons_round_without_result() {
    let plan = vec![PlannedReveal::new(1, TileKind::Reward).after(50)];
    let (handle, task) = spawn_scripted(plan, RoundConfig::default(), Collaborators::default());
    let mut results = handle.match_results();

    handle.start();
    tokio::time::sleep(Duration::from_millis(80)).await;
    handle.reset();
    settle().await;

    let snap = handle.snapshot();
    assert_eq!(snap.phase, Phase::Ready);
    assert_eq!(snap.lives, 3);
    assert_eq!(snap.elapsed_ms, 0);
    assert_eq!(snap.revealed().count(), 0);
    assert!(results.try_recv().is_err());

    handle.shutdown();
    task.await.unwrap();
}
