//! TCP server for remote control
//!
//! Each connection gets a reader loop (commands in) and a writer task (lines
//! out). Replies wait in a small bounded queue; observations come straight
//! from the snapshot channel, so a client that stops reading holds at most
//! one pending snapshot.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, oneshot, watch};

use crate::core::{MatchResult, RoundSnapshot};
use crate::engine::CoordinatorHandle;
use crate::protocol::*;

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables.
    ///
    /// - `TILE_REFLEX_ADAPTER_HOST`: bind address (default `127.0.0.1`)
    /// - `TILE_REFLEX_ADAPTER_PORT`: port (default 7878, 0 picks a free port)
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TILE_REFLEX_ADAPTER_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("TILE_REFLEX_ADAPTER_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);

        Self { host, port }
    }

    /// `TILE_REFLEX_ADAPTER_DISABLED` set to `1` or `true`.
    pub fn is_disabled() -> bool {
        std::env::var("TILE_REFLEX_ADAPTER_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid adapter address {}:{}", self.host, self.port))
    }
}

/// Live counters shared with the UI.
#[derive(Debug, Default)]
pub struct ServerStatus {
    clients: AtomicUsize,
    next_seq: AtomicU64,
}

impl ServerStatus {
    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Replies queued per client before new ones are dropped.
const REPLY_QUEUE_CAPACITY: usize = 64;

/// Direct answers to client commands.
#[derive(Debug, Clone)]
enum Reply {
    Ack(AckMessage),
    Error(ErrorMessage),
}

/// Start the TCP server and serve clients until the listener fails.
///
/// `ready_tx` receives the bound address once listening.
pub async fn run_server(
    config: ServerConfig,
    handle: CoordinatorHandle,
    status: Arc<ServerStatus>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(config.socket_addr()?).await?;
    let bound = listener.local_addr()?;
    tracing::info!("Adapter listening on {}", bound);
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let mut client_id_counter = 0usize;
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        tracing::info!("Client {} connected from {}", client_id, addr);

        let handle = handle.clone();
        let status = Arc::clone(&status);
        tokio::spawn(async move {
            status.clients.fetch_add(1, Ordering::Relaxed);
            if let Err(e) = handle_client(socket, client_id, handle, Arc::clone(&status)).await {
                tracing::warn!("Client {} error: {}", client_id, e);
            }
            status.clients.fetch_sub(1, Ordering::Relaxed);
            tracing::info!("Client {} disconnected", client_id);
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    client_id: usize,
    handle: CoordinatorHandle,
    status: Arc<ServerStatus>,
) -> anyhow::Result<()> {
    let (reader, writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, rx) = mpsc::channel::<Reply>(REPLY_QUEUE_CAPACITY);

    let write_task = tokio::spawn(write_outbound(
        writer,
        rx,
        handle.subscribe(),
        handle.match_results(),
        Arc::clone(&status),
    ));

    let mut line = String::new();
    let mut last_seq: Option<u64> = None;

    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let reply = match parse_message(trimmed) {
            Ok(ParsedMessage::Command(cmd)) => command_reply(&cmd, &mut last_seq, &handle, client_id),
            Ok(ParsedMessage::Unknown { seq }) => Reply::Error(create_error(
                seq,
                ErrorCode::InvalidCommand,
                "Unknown message type",
            )),
            Err(e) => Reply::Error(create_error(
                extract_seq_best_effort(trimmed).unwrap_or(0),
                ErrorCode::InvalidCommand,
                &format!("JSON parse error: {}", e),
            )),
        };

        match tx.try_send(reply) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!("Client {} is not reading; dropping reply", client_id);
            }
            Err(mpsc::error::TrySendError::Closed(_)) => break,
        }
    }

    drop(tx);
    let _ = write_task.await;
    Ok(())
}

fn command_reply(
    cmd: &CommandMessage,
    last_seq: &mut Option<u64>,
    handle: &CoordinatorHandle,
    client_id: usize,
) -> Reply {
    if last_seq.is_some_and(|prev| cmd.seq <= prev) {
        return Reply::Error(create_error(
            cmd.seq,
            ErrorCode::InvalidCommand,
            "seq must be strictly increasing",
        ));
    }
    *last_seq = Some(cmd.seq);

    match map_command(cmd) {
        Ok(command) => {
            tracing::debug!("Client {} seq {}: {}", client_id, cmd.seq, command.as_str());
            if handle.send(command) {
                Reply::Ack(create_ack(cmd.seq))
            } else {
                Reply::Error(create_error(
                    cmd.seq,
                    ErrorCode::Unavailable,
                    "Round coordinator stopped",
                ))
            }
        }
        Err((code, message)) => Reply::Error(create_error(cmd.seq, code, &message)),
    }
}

/// Write replies, observations and finished rounds to one client.
///
/// Observations are read straight from the snapshot channel, so a client
/// that falls behind only ever gets the newest snapshot once it catches up.
/// Returns when the reply channel closes or the client stops accepting data.
async fn write_outbound<W>(
    mut writer: W,
    mut replies: mpsc::Receiver<Reply>,
    mut snapshots: watch::Receiver<RoundSnapshot>,
    mut results: broadcast::Receiver<MatchResult>,
    status: Arc<ServerStatus>,
) where
    W: AsyncWrite + Unpin,
{
    let mut buf: Vec<u8> = Vec::with_capacity(1024);

    let first = build_observation(&snapshots.borrow_and_update(), status.next_seq());
    if write_line(&mut writer, &mut buf, &first).await.is_err() {
        return;
    }

    let mut watching = true;
    let mut results_open = true;
    loop {
        let written = tokio::select! {
            reply = replies.recv() => match reply {
                Some(Reply::Ack(m)) => write_line(&mut writer, &mut buf, &m).await,
                Some(Reply::Error(m)) => write_line(&mut writer, &mut buf, &m).await,
                None => break,
            },
            changed = snapshots.changed(), if watching => {
                if changed.is_err() {
                    watching = false;
                    continue;
                }
                let obs = build_observation(&snapshots.borrow_and_update(), status.next_seq());
                write_line(&mut writer, &mut buf, &obs).await
            }
            result = results.recv(), if results_open => match result {
                Ok(result) => {
                    let msg = create_match_complete(result, status.next_seq());
                    write_line(&mut writer, &mut buf, &msg).await
                }
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => {
                    results_open = false;
                    continue;
                }
            },
        };
        if written.is_err() {
            break;
        }
    }
}

async fn write_line<W, T>(writer: &mut W, buf: &mut Vec<u8>, msg: &T) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    buf.clear();
    serde_json::to_writer(&mut *buf, msg)?;
    buf.push(b'\n');
    writer.write_all(buf).await?;
    writer.flush().await
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .count();
    rest[..end].parse::<u64>().ok()
}
