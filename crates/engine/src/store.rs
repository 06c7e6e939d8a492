//! Match history persistence
//!
//! The coordinator hands every finished round to a [`MatchSink`]. The call is
//! fire-and-forget from the round's point of view: a failed save is logged by
//! the runtime and never reopens the round.
//!
//! Two stores are provided:
//! - [`MatchHistory`]: in-memory, for tests and ephemeral sessions
//! - [`JsonlMatchStore`]: append-only JSON-lines file with an in-memory index

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tile_reflex_core::MatchResult;

use crate::error::Result;

/// Receiver of finished rounds.
pub trait MatchSink: Send + Sync {
    fn on_match_complete(&self, result: MatchResult) -> Result<()>;
}

/// Best results of `player_id`: score descending, then shorter rounds first.
pub fn rank_top_scores<'a>(
    entries: impl IntoIterator<Item = &'a MatchResult>,
    player_id: &str,
    limit: usize,
) -> Vec<MatchResult> {
    let mut out: Vec<MatchResult> = entries
        .into_iter()
        .filter(|m| m.player_id == player_id)
        .cloned()
        .collect();
    out.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.duration_ms.cmp(&b.duration_ms))
    });
    out.truncate(limit);
    out
}

/// In-memory match history.
#[derive(Debug, Default)]
pub struct MatchHistory {
    entries: Mutex<Vec<MatchResult>>,
}

impl MatchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<MatchResult>) -> Self {
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn record(&self, result: MatchResult) {
        self.entries.lock().push(result);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn all(&self) -> Vec<MatchResult> {
        self.entries.lock().clone()
    }

    pub fn top_scores(&self, player_id: &str, limit: usize) -> Vec<MatchResult> {
        rank_top_scores(self.entries.lock().iter(), player_id, limit)
    }

    /// Every round of `player_id`, most recent first.
    pub fn history(&self, player_id: &str) -> Vec<MatchResult> {
        let mut out: Vec<MatchResult> = self
            .entries
            .lock()
            .iter()
            .filter(|m| m.player_id == player_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.timestamp_ms.cmp(&a.timestamp_ms));
        out
    }
}

impl MatchSink for MatchHistory {
    fn on_match_complete(&self, result: MatchResult) -> Result<()> {
        self.record(result);
        Ok(())
    }
}

/// Append-only JSON-lines match store.
///
/// One `MatchResult` per line. Lines that fail to parse are skipped on load.
#[derive(Debug)]
pub struct JsonlMatchStore {
    path: PathBuf,
    index: MatchHistory,
    write_lock: Mutex<()>,
}

impl JsonlMatchStore {
    /// Open (or create on first write) the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut entries = Vec::new();

        if path.exists() {
            let reader = BufReader::new(fs::File::open(&path)?);
            for (lineno, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<MatchResult>(&line) {
                    Ok(result) => entries.push(result),
                    Err(e) => {
                        tracing::warn!(
                            "Skipping corrupt match record {}:{}: {}",
                            path.display(),
                            lineno + 1,
                            e
                        );
                    }
                }
            }
        }

        tracing::info!("Loaded {} match records from {}", entries.len(), path.display());

        Ok(Self {
            path,
            index: MatchHistory::with_entries(entries),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn top_scores(&self, player_id: &str, limit: usize) -> Vec<MatchResult> {
        self.index.top_scores(player_id, limit)
    }

    pub fn history(&self, player_id: &str) -> Vec<MatchResult> {
        self.index.history(player_id)
    }

    fn append(&self, result: &MatchResult) -> Result<()> {
        let mut line = serde_json::to_vec(result)?;
        line.push(b'\n');

        let _guard = self.write_lock.lock();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        file.flush()?;
        Ok(())
    }
}

impl MatchSink for JsonlMatchStore {
    fn on_match_complete(&self, result: MatchResult) -> Result<()> {
        self.append(&result)?;
        self.index.record(result);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn result(player: &str, score: u32, duration_ms: u64, timestamp_ms: u64) -> MatchResult {
        MatchResult {
            id: format!("{}_{}", player, timestamp_ms),
            player_id: player.to_string(),
            score,
            duration_ms,
            difficulty: "NORMAL".to_string(),
            timestamp_ms,
            correct_taps: score,
            total_taps: score,
            total_reflex_time_ms: 0,
            perfect_streak: 0,
        }
    }

    #[test]
    fn top_scores_order_and_limit() {
        let history = MatchHistory::new();
        history.record(result("a", 5, 9000, 1));
        history.record(result("a", 9, 20_000, 2));
        history.record(result("a", 9, 15_000, 3));
        history.record(result("b", 50, 1000, 4));
        history.record(result("a", 1, 1000, 5));
        history.record(result("a", 7, 1000, 6));
        history.record(result("a", 2, 1000, 7));
        history.record(result("a", 3, 1000, 8));

        let top = history.top_scores("a", 5);
        let scores: Vec<(u32, u64)> = top.iter().map(|m| (m.score, m.duration_ms)).collect();
        assert_eq!(
            scores,
            vec![(9, 15_000), (9, 20_000), (7, 1000), (5, 9000), (3, 1000)]
        );
    }

    #[test]
    fn history_is_most_recent_first() {
        let history = MatchHistory::new();
        history.record(result("a", 1, 1000, 10));
        history.record(result("a", 2, 1000, 30));
        history.record(result("b", 3, 1000, 40));
        history.record(result("a", 3, 1000, 20));

        let ts: Vec<u64> = history.history("a").iter().map(|m| m.timestamp_ms).collect();
        assert_eq!(ts, vec![30, 20, 10]);
    }

    #[test]
    fn jsonl_store_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("matches.jsonl");

        {
            let store = JsonlMatchStore::open(&path).unwrap();
            assert!(store.is_empty());
            store.on_match_complete(result("p", 4, 8000, 1)).unwrap();
            store.on_match_complete(result("p", 6, 9000, 2)).unwrap();
        }

        let reopened = JsonlMatchStore::open(&path).unwrap();
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.top_scores("p", 5)[0].score, 6);
    }

    #[test]
    fn jsonl_store_skips_corrupt_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("matches.jsonl");
        let good = serde_json::to_string(&result("p", 2, 100, 1)).unwrap();
        fs::write(&path, format!("{}\nnot json\n\n{}\n", good, good)).unwrap();

        let store = JsonlMatchStore::open(&path).unwrap();
        assert_eq!(store.len(), 2);
    }
}
