//! Key mapping from terminal events to round commands.

use arrayvec::ArrayVec;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::types::{Difficulty, Phase, RoundCommand, TileId, TILE_KEYS};

/// What a key asks for, before it is resolved against the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Tap(TileId),
    Start,
    TogglePause,
    Reset,
    SetDifficulty(Difficulty),
    /// Open the rules dialog.
    ShowRules,
}

/// Key handling while the rules dialog is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RulesKey {
    /// Flip the "show on startup" checkbox.
    ToggleStartup,
    /// Close the dialog, saving the checkbox.
    Close,
}

/// Commands produced by one key press.
pub type Commands = ArrayVec<RoundCommand, 2>;

impl InputAction {
    /// Resolve into round commands for the given phase.
    ///
    /// `Start` in `Over` restarts the round; `TogglePause` pauses while
    /// playing and resumes a manual pause. Opening the rules pauses a
    /// running round.
    pub fn commands(self, phase: Phase) -> Commands {
        let mut out = Commands::new();
        match self {
            InputAction::Tap(id) => out.push(RoundCommand::Tap(id)),
            InputAction::Start => {
                if phase == Phase::Over {
                    out.push(RoundCommand::Reset);
                }
                out.push(RoundCommand::Start);
            }
            InputAction::TogglePause => {
                if phase.is_playing() {
                    out.push(RoundCommand::Pause);
                } else if phase.is_paused() {
                    out.push(RoundCommand::Resume);
                }
            }
            InputAction::Reset => out.push(RoundCommand::Reset),
            InputAction::SetDifficulty(d) => out.push(RoundCommand::SetDifficulty(d)),
            InputAction::ShowRules => {
                if phase.is_playing() {
                    out.push(RoundCommand::Pause);
                }
            }
        }
        out
    }
}

/// Tile bound to `c` (case-insensitive).
pub fn tile_for_key(c: char) -> Option<TileId> {
    let c = c.to_ascii_lowercase();
    TILE_KEYS
        .iter()
        .position(|&k| k == c)
        .map(|i| i as TileId)
}

/// Key label for a tile, if it has one.
pub fn key_for_tile(id: TileId) -> Option<char> {
    TILE_KEYS.get(id as usize).copied()
}

/// Map keyboard input to an action.
pub fn handle_key_event(key: KeyEvent) -> Option<InputAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return None;
    }

    match key.code {
        KeyCode::Enter => Some(InputAction::Start),
        KeyCode::Char('p') | KeyCode::Char('P') => Some(InputAction::TogglePause),
        KeyCode::Backspace => Some(InputAction::Reset),
        KeyCode::Char('?') | KeyCode::F(4) => Some(InputAction::ShowRules),

        KeyCode::F(1) => Some(InputAction::SetDifficulty(Difficulty::Easy)),
        KeyCode::F(2) => Some(InputAction::SetDifficulty(Difficulty::Normal)),
        KeyCode::F(3) => Some(InputAction::SetDifficulty(Difficulty::Hard)),

        KeyCode::Char(c) => tile_for_key(c).map(InputAction::Tap),

        _ => None,
    }
}

/// Map a key pressed while the rules dialog is shown.
///
/// Space flips the startup checkbox; any other key closes the dialog.
pub fn handle_rules_key(key: KeyEvent) -> RulesKey {
    match key.code {
        KeyCode::Char(' ') => RulesKey::ToggleStartup,
        _ => RulesKey::Close,
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PauseReason;

    #[test]
    fn test_tile_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('1'))),
            Some(InputAction::Tap(0))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('r'))),
            Some(InputAction::Tap(7))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('A'))),
            Some(InputAction::Tap(8))
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('v'))),
            Some(InputAction::Tap(15))
        );
        assert_eq!(handle_key_event(KeyEvent::from(KeyCode::Char('m'))), None);
    }

    #[test]
    fn test_tile_labels_round_trip() {
        for id in 0..16u8 {
            let key = key_for_tile(id).unwrap();
            assert_eq!(tile_for_key(key), Some(id));
        }
        assert_eq!(key_for_tile(16), None);
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Enter)),
            Some(InputAction::Start)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('P'))),
            Some(InputAction::TogglePause)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Backspace)),
            Some(InputAction::Reset)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::F(3))),
            Some(InputAction::SetDifficulty(Difficulty::Hard))
        );
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            None
        );
    }

    #[test]
    fn test_toggle_pause_resolution() {
        assert_eq!(
            InputAction::TogglePause.commands(Phase::Playing).as_slice(),
            &[RoundCommand::Pause]
        );
        assert_eq!(
            InputAction::TogglePause
                .commands(Phase::Paused(PauseReason::Manual))
                .as_slice(),
            &[RoundCommand::Resume]
        );
        assert!(InputAction::TogglePause.commands(Phase::Ready).is_empty());
    }

    #[test]
    fn test_start_after_game_over_restarts() {
        assert_eq!(
            InputAction::Start.commands(Phase::Over).as_slice(),
            &[RoundCommand::Reset, RoundCommand::Start]
        );
        assert_eq!(
            InputAction::Start.commands(Phase::Ready).as_slice(),
            &[RoundCommand::Start]
        );
    }

    #[test]
    fn test_rules_can_be_reopened() {
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::Char('?'))),
            Some(InputAction::ShowRules)
        );
        assert_eq!(
            handle_key_event(KeyEvent::from(KeyCode::F(4))),
            Some(InputAction::ShowRules)
        );
        assert_eq!(tile_for_key('?'), None);

        assert_eq!(
            InputAction::ShowRules.commands(Phase::Playing).as_slice(),
            &[RoundCommand::Pause]
        );
        assert!(InputAction::ShowRules.commands(Phase::Ready).is_empty());
        assert!(InputAction::ShowRules
            .commands(Phase::Paused(PauseReason::Penalty))
            .is_empty());
    }

    #[test]
    fn test_rules_dialog_keys() {
        assert_eq!(
            handle_rules_key(KeyEvent::from(KeyCode::Char(' '))),
            RulesKey::ToggleStartup
        );
        assert_eq!(handle_rules_key(KeyEvent::from(KeyCode::Enter)), RulesKey::Close);
        assert_eq!(
            handle_rules_key(KeyEvent::from(KeyCode::Char('q'))),
            RulesKey::Close
        );
    }

    #[test]
    fn test_quit_keys() {
        assert!(should_quit(KeyEvent::from(KeyCode::Esc)));
        assert!(should_quit(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!should_quit(KeyEvent::from(KeyCode::Char('c'))));
    }
}
