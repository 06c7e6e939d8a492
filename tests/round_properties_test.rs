//! Round coordinator scenarios driven by a manual clock and scripted reveals.

use tile_reflex::core::{
    ManualTime, PlannedReveal, RoundConfig, RevealPicker, RoundCoordinator, RoundEvent,
    ScriptedPicker,
};
use tile_reflex::types::{Difficulty, PauseReason, Phase, TileKind};

type Round = RoundCoordinator<ManualTime, ScriptedPicker>;

fn round_with(config: RoundConfig, plan: Vec<PlannedReveal>) -> (ManualTime, Round) {
    let time = ManualTime::with_epoch(1_700_000_000_000);
    let round = RoundCoordinator::with_picker(config, time.clone(), ScriptedPicker::new(plan));
    (time, round)
}

fn round(plan: Vec<PlannedReveal>) -> (ManualTime, Round) {
    round_with(RoundConfig::default(), plan)
}

fn advance_to(time: &ManualTime, round: &mut Round, ms: u64) {
    time.set(ms);
    round.tick();
}

fn match_results<P: RevealPicker>(round: &mut RoundCoordinator<ManualTime, P>) -> Vec<RoundEvent> {
    round
        .drain_events()
        .filter(|e| matches!(e, RoundEvent::MatchComplete(_)))
        .collect()
}

fn assert_ready_state(round: &Round) {
    assert_eq!(round.phase(), Phase::Ready);
    assert_eq!(round.score(), 0);
    assert_eq!(round.lives(), 3);
    assert_eq!(round.consecutive_misses(), 0);
    assert_eq!(round.tiles().revealed_count(), 0);
    assert_eq!(round.elapsed_ms(), 0);
}

#[test]
fn test_elapsed_excludes_manual_pause() {
    let (time, mut round) = round(vec![PlannedReveal::new(0, TileKind::Reward).after(60_000)]);
    round.start();

    advance_to(&time, &mut round, 5000);
    round.pause();
    advance_to(&time, &mut round, 8000);
    round.resume();
    advance_to(&time, &mut round, 10_000);

    assert_eq!(round.elapsed_ms(), 7000);
    assert_eq!(round.phase(), Phase::Playing);
}

#[test]
fn test_pause_and_resume_are_idempotent() {
    let (time, mut round) = round(vec![PlannedReveal::new(0, TileKind::Reward).after(60_000)]);
    round.start();
    round.drain_events().for_each(drop);

    time.set(1000);
    round.pause();
    round.pause();
    assert_eq!(round.phase(), Phase::Paused(PauseReason::Manual));

    time.set(1500);
    round.resume();
    round.resume();
    assert_eq!(round.phase(), Phase::Playing);

    let transitions = round
        .drain_events()
        .filter(|e| matches!(e, RoundEvent::PhaseChanged { .. }))
        .count();
    assert_eq!(transitions, 2);
    assert_eq!(round.elapsed_ms(), 1000);
}

#[test]
fn test_two_missed_rewards_cost_a_life() {
    // NORMAL: reveal every 400ms, visible 1000ms, threshold 2, cooldown 1000ms.
    let (time, mut round) = round(vec![
        PlannedReveal::new(1, TileKind::Reward),
        PlannedReveal::new(2, TileKind::Reward),
        PlannedReveal::new(3, TileKind::Reward).after(60_000),
    ]);
    round.start();

    advance_to(&time, &mut round, 400);
    assert!(round.tiles().is_revealed(1));

    advance_to(&time, &mut round, 1400);
    assert_eq!(round.consecutive_misses(), 1);
    assert_eq!(round.lives(), 3);
    assert!(!round.tiles().is_revealed(1));

    advance_to(&time, &mut round, 1800);
    assert!(round.tiles().is_revealed(2));

    advance_to(&time, &mut round, 2800);
    assert_eq!(round.lives(), 2);
    assert_eq!(round.consecutive_misses(), 0);
    assert_eq!(round.phase(), Phase::Paused(PauseReason::Penalty));
    assert_eq!(round.tiles().revealed_count(), 0);

    // A manual resume cannot cut the penalty short.
    advance_to(&time, &mut round, 3000);
    round.resume();
    assert_eq!(round.phase(), Phase::Paused(PauseReason::Penalty));

    advance_to(&time, &mut round, 3800);
    assert_eq!(round.phase(), Phase::Playing);
    assert_eq!(round.elapsed_ms(), 2800);
}

#[test]
fn test_tap_between_misses_resets_the_counter() {
    let (time, mut round) = round(vec![
        PlannedReveal::new(1, TileKind::Reward),
        PlannedReveal::new(2, TileKind::Reward),
        PlannedReveal::new(3, TileKind::Reward),
        PlannedReveal::new(4, TileKind::Reward).after(60_000),
    ]);
    round.start();

    advance_to(&time, &mut round, 1400);
    assert_eq!(round.consecutive_misses(), 1);

    advance_to(&time, &mut round, 1900);
    round.tap(2);
    assert_eq!(round.score(), 1);
    assert_eq!(round.consecutive_misses(), 0);

    // Tile 3 is revealed at 2300 and expires untouched at 3300.
    advance_to(&time, &mut round, 3300);
    assert_eq!(round.consecutive_misses(), 1);
    assert_eq!(round.lives(), 3);
    assert_eq!(round.phase(), Phase::Playing);
}

#[test]
fn test_hazard_tap_costs_a_life_immediately() {
    let (time, mut round) = round(vec![
        PlannedReveal::new(3, TileKind::Hazard),
        PlannedReveal::new(4, TileKind::Reward).after(60_000),
    ]);
    round.start();

    advance_to(&time, &mut round, 500);
    round.tap(3);

    assert_eq!(round.lives(), 2);
    assert_eq!(round.score(), 0);
    assert_eq!(round.phase(), Phase::Paused(PauseReason::Penalty));
    assert!(!round.tiles().is_revealed(3));
    assert_eq!(round.penalty_remaining_ms(), Some(1000));
}

#[test]
fn test_hazard_tap_with_a_pending_miss_resets_the_counter() {
    let (time, mut round) = round(vec![
        PlannedReveal::new(1, TileKind::Reward),
        PlannedReveal::new(2, TileKind::Hazard),
        PlannedReveal::new(3, TileKind::Reward),
        PlannedReveal::new(4, TileKind::Reward).after(60_000),
    ]);
    round.start();

    // Tile 1 shows at 400 and expires at 1400.
    advance_to(&time, &mut round, 1400);
    assert_eq!(round.consecutive_misses(), 1);
    assert_eq!(round.lives(), 3);

    // Hazard shows at 1800.
    advance_to(&time, &mut round, 1850);
    round.tap(2);
    assert_eq!(round.lives(), 2);
    assert_eq!(round.consecutive_misses(), 0);
    assert_eq!(round.phase(), Phase::Paused(PauseReason::Penalty));

    // Penalty ends at 2850; tile 3 shows 400ms of play later and expires
    // 1000ms after that. A single miss must not cost another life.
    advance_to(&time, &mut round, 2850);
    assert_eq!(round.phase(), Phase::Playing);
    advance_to(&time, &mut round, 4250);
    assert_eq!(round.consecutive_misses(), 1);
    assert_eq!(round.lives(), 2);
    assert_eq!(round.phase(), Phase::Playing);
}

#[test]
fn test_expired_hazard_is_free() {
    let (time, mut round) = round(vec![
        PlannedReveal::new(3, TileKind::Hazard),
        PlannedReveal::new(4, TileKind::Hazard),
        PlannedReveal::new(5, TileKind::Reward).after(60_000),
    ]);
    round.start();

    advance_to(&time, &mut round, 3000);
    assert_eq!(round.lives(), 3);
    assert_eq!(round.consecutive_misses(), 0);
    assert_eq!(round.phase(), Phase::Playing);
}

#[test]
fn test_last_life_ends_the_round_once() {
    let config = RoundConfig {
        starting_lives: 1,
        player_id: "p1".to_string(),
        ..RoundConfig::default()
    };
    let (time, mut round) = round_with(
        config,
        vec![
            PlannedReveal::new(0, TileKind::Reward),
            PlannedReveal::new(1, TileKind::Hazard),
        ],
    );
    round.set_difficulty(Difficulty::Easy);
    round.start();

    // EASY: first reveal after 600ms.
    advance_to(&time, &mut round, 700);
    round.tap(0);
    // Next reveal 600ms after the tap.
    advance_to(&time, &mut round, 1350);
    round.tap(1);

    assert_eq!(round.phase(), Phase::Over);
    assert_eq!(round.lives(), 0);

    let results = match_results(&mut round);
    assert_eq!(results.len(), 1);
    let RoundEvent::MatchComplete(result) = &results[0] else {
        unreachable!()
    };
    assert_eq!(result.score, 1);
    assert_eq!(result.duration_ms, 1350);
    assert_eq!(result.difficulty, "EASY");
    assert_eq!(result.player_id, "p1");
    assert_eq!(result.timestamp_ms, 1_700_000_001_350);
    assert_eq!(result.id, "p1_1700000001350");
    assert_eq!(result.correct_taps, 1);
    assert_eq!(result.total_taps, 2);
    assert_eq!(result.total_reflex_time_ms, 100);

    // Nothing happens after the round is over.
    advance_to(&time, &mut round, 20_000);
    round.tap(0);
    round.resume();
    let reveals = round
        .drain_events()
        .filter(|e| matches!(e, RoundEvent::TileRevealed(_) | RoundEvent::MatchComplete(_)))
        .count();
    assert_eq!(reveals, 0);
    assert_eq!(round.tiles().revealed_count(), 0);
    assert_eq!(round.elapsed_ms(), 1350);
}

#[test]
fn test_expiry_wins_a_tie_with_a_late_tap() {
    let (time, mut round) = round(vec![
        PlannedReveal::new(6, TileKind::Reward),
        PlannedReveal::new(7, TileKind::Reward).after(60_000),
    ]);
    round.start();
    advance_to(&time, &mut round, 400);
    assert!(round.tiles().is_revealed(6));

    // No tick between reveal and expiry: the tap arrives exactly at expiry.
    time.set(1400);
    round.tap(6);
    assert_eq!(round.score(), 0);
    assert_eq!(round.consecutive_misses(), 1);
}

#[test]
fn test_reset_always_returns_to_ready() {
    let (time, mut round) = round(vec![
        PlannedReveal::new(3, TileKind::Hazard),
        PlannedReveal::new(4, TileKind::Reward),
    ]);

    assert_ready_state(&round);

    round.start();
    advance_to(&time, &mut round, 500);
    round.tap(3);
    assert_eq!(round.phase(), Phase::Paused(PauseReason::Penalty));
    round.reset();
    assert_ready_state(&round);

    round.start();
    advance_to(&time, &mut round, 1000);
    round.pause();
    round.reset();
    assert_ready_state(&round);
    assert!(match_results(&mut round).is_empty());

    // A fresh round after reset starts from scratch.
    round.start();
    assert_eq!(round.phase(), Phase::Playing);
    assert_eq!(round.lives(), 3);
}

#[test]
fn test_invariants_hold_over_a_long_seeded_session() {
    let time = ManualTime::new();
    let config = RoundConfig {
        seed: Some(0xC0FFEE),
        ..RoundConfig::default()
    };
    let mut round = RoundCoordinator::new(config, time.clone());
    round.set_difficulty(Difficulty::Hard);
    round.start();

    let mut finished = 0;
    for step in 0u64..20_000 {
        time.advance(7 + step % 23);
        match step % 5 {
            0 => {
                let revealed = round.tiles().iter().find(|t| t.revealed).map(|t| t.id);
                if let Some(id) = revealed {
                    round.tap(id);
                }
            }
            1 => round.tap((step % 16) as u8),
            _ => round.tick(),
        }

        assert_eq!(round.lives() == 0, round.phase() == Phase::Over);
        assert!(round.tiles().revealed_count() <= 1);
        if !round.phase().is_playing() {
            assert_eq!(round.tiles().revealed_count(), 0);
        }

        finished += match_results(&mut round).len();
        if round.phase() == Phase::Over {
            round.reset();
            round.start();
        }
    }
    assert!(finished > 0);
}
