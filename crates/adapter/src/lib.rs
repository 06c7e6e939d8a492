//! Adapter module - remote control via TCP socket with a JSON protocol
//!
//! External agents (bots, test harnesses) drive the round through the same
//! command queue as the keyboard and receive the same snapshots the terminal
//! renders.
//!
//! # Protocol Overview
//!
//! Line-delimited JSON over TCP:
//!
//! 1. **Connection**: client connects (default `127.0.0.1:7878`) and
//!    immediately receives an `observation` of the current round
//! 2. **Commanding**: client sends `command` messages; each is answered with
//!    `ack` (queued) or `error`
//! 3. **Streaming**: every snapshot change is pushed as an `observation`;
//!    a finished round is pushed as `match_complete`
//!
//! Per-client `seq` must strictly increase; a stale `seq` is rejected with
//! `invalid_command`.
//!
//! # Example Protocol Flow
//!
//! ```text
//! Server -> Client: {"type":"observation","seq":1,"ts":1700000000000,"phase":"ready",...}
//! Client -> Server: {"type":"command","seq":1,"action":"difficulty","difficulty":"hard"}
//! Server -> Client: {"type":"ack","seq":1,"ts":1700000000010}
//! Client -> Server: {"type":"command","seq":2,"action":"start"}
//! Client -> Server: {"type":"command","seq":3,"action":"tap","tile":5}
//! Server -> Client: {"type":"match_complete","seq":97,"ts":...,"result":{...}}
//! ```
//!
//! # Environment Variables
//!
//! - `TILE_REFLEX_ADAPTER_HOST`: bind address (default "127.0.0.1")
//! - `TILE_REFLEX_ADAPTER_PORT`: port (default 7878)
//! - `TILE_REFLEX_ADAPTER_DISABLED`: "1" or "true" disables the adapter

pub mod protocol;
pub mod server;

pub use tile_reflex_core as core;
pub use tile_reflex_engine as engine;
pub use tile_reflex_types as types;

pub use protocol::*;
pub use server::{run_server, ServerConfig, ServerStatus};
