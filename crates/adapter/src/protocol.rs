//! Protocol module - JSON message types for remote control
//!
//! Line-delimited JSON. Every message carries `type` and `seq`; server
//! messages also carry `ts` (epoch milliseconds).

use serde::{Deserialize, Serialize};

use crate::core::{MatchResult, RoundSnapshot};
use crate::types::{Difficulty, RoundCommand, TileId};

// ============== Client -> Server Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    Start,
    Pause,
    Resume,
    Reset,
    Tap,
    Difficulty,
}

/// Client command.
///
/// `tile` is required for `tap`, `difficulty` (tier name) for `difficulty`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    #[serde(default)]
    pub ts: u64,
    pub action: ActionName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tile: Option<TileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedMessage {
    Command(CommandMessage),
    /// Well-formed JSON with an unknown `type`.
    Unknown { seq: u64 },
}

/// Parse one inbound line.
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "command")]
        Command(CommandMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Err(e) => {
            let value: serde_json::Value = serde_json::from_str(json)?;
            let known_type = value.get("type").and_then(|t| t.as_str()) == Some("command");
            if known_type || !value.is_object() {
                return Err(e);
            }
            let seq = value.get("seq").and_then(|v| v.as_u64()).unwrap_or(0);
            Ok(ParsedMessage::Unknown { seq })
        }
    }
}

/// Map a client command onto a round command.
pub fn map_command(cmd: &CommandMessage) -> Result<RoundCommand, (ErrorCode, String)> {
    let command = match cmd.action {
        ActionName::Start => RoundCommand::Start,
        ActionName::Pause => RoundCommand::Pause,
        ActionName::Resume => RoundCommand::Resume,
        ActionName::Reset => RoundCommand::Reset,
        ActionName::Tap => match cmd.tile {
            Some(tile) => RoundCommand::Tap(tile),
            None => {
                return Err((ErrorCode::InvalidCommand, "tap requires a tile".to_string()));
            }
        },
        ActionName::Difficulty => {
            let name = cmd.difficulty.as_deref().unwrap_or_default();
            match Difficulty::from_str(name) {
                Some(d) => RoundCommand::SetDifficulty(d),
                None => {
                    return Err((
                        ErrorCode::InvalidCommand,
                        format!("Unknown difficulty: {:?}", name),
                    ));
                }
            }
        }
    };
    Ok(command)
}

// ============== Server -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchCompleteType {
    #[serde(rename = "match_complete")]
    MatchComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidCommand,
    Unavailable,
}

/// Command accepted (queued for the round).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedTile {
    pub id: TileId,
    pub kind: String,
}

/// Round snapshot as seen by remote clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    /// `ready`, `playing`, `paused`, `penalty` or `over`.
    pub phase: String,
    pub playable: bool,
    pub score: u32,
    pub lives: u32,
    pub elapsed_ms: u64,
    pub difficulty: String,
    pub consecutive_misses: u32,
    pub tile_count: u8,
    pub revealed: Vec<RevealedTile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCompleteMessage {
    #[serde(rename = "type")]
    pub msg_type: MatchCompleteType,
    pub seq: u64,
    pub ts: u64,
    pub result: MatchResult,
}

// ============== Utility Functions ==============

pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
    }
}

pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

pub fn build_observation(snap: &RoundSnapshot, seq: u64) -> ObservationMessage {
    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        phase: snap.phase.as_str().to_string(),
        playable: snap.playable(),
        score: snap.score,
        lives: snap.lives,
        elapsed_ms: snap.elapsed_ms,
        difficulty: snap.difficulty.as_str().to_string(),
        consecutive_misses: snap.consecutive_misses,
        tile_count: snap.tiles.len() as u8,
        revealed: snap
            .revealed()
            .map(|t| RevealedTile {
                id: t.id,
                kind: t.kind.as_str().to_string(),
            })
            .collect(),
    }
}

pub fn create_match_complete(result: MatchResult, seq: u64) -> MatchCompleteMessage {
    MatchCompleteMessage {
        msg_type: MatchCompleteType::MatchComplete,
        seq,
        ts: current_timestamp_ms(),
        result,
    }
}

fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
