//! Terminal reflex-tile runner (default binary).
//!
//! The round runs on a tokio task; this thread owns the terminal, polls
//! crossterm for keys and renders published snapshots into a framebuffer.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use tokio::runtime::Runtime;

use tile_reflex::adapter::{run_server, ServerConfig, ServerStatus};
use tile_reflex::core::MatchResult;
use tile_reflex::engine::{
    init_file_logging, rank_top_scores, spawn, AudioCue, Collaborators, CoordinatorHandle,
    EngineConfig, JsonlMatchStore, MatchHistory, MatchSink, PrefsStore, RulesPrefs,
};
use tile_reflex::input::{handle_key_event, handle_rules_key, should_quit, InputAction, RulesKey};
use tile_reflex::term::{FrameBuffer, GridView, Panel, TerminalRenderer, Viewport};
use tile_reflex::types::{TICK_MS, TOP_SCORES_LIMIT};

/// Audio cue that rings the terminal bell from the render thread.
#[derive(Debug, Default)]
struct TerminalBell {
    pending: AtomicBool,
}

impl TerminalBell {
    fn take(&self) -> bool {
        self.pending.swap(false, Ordering::Relaxed)
    }
}

impl AudioCue for TerminalBell {
    fn hazard_hit(&self) {
        self.pending.store(true, Ordering::Relaxed);
    }

    fn game_over(&self) {
        self.pending.store(true, Ordering::Relaxed);
    }
}

struct Session {
    handle: CoordinatorHandle,
    bell: Arc<TerminalBell>,
    adapter: Option<Arc<ServerStatus>>,
    player_id: String,
    best: Vec<MatchResult>,
    prefs: Option<PrefsStore>,
    rules: RulesPrefs,
}

fn main() -> Result<()> {
    let config = EngineConfig::from_env();
    if let Some(path) = &config.log_path {
        init_file_logging(path)?;
    }

    let rt = Runtime::new()?;
    let guard = rt.enter();

    let (sink, best): (Arc<dyn MatchSink>, Vec<MatchResult>) = match &config.history_path {
        Some(path) => {
            let store = JsonlMatchStore::open(path)?;
            let best = store.top_scores(&config.round.player_id, TOP_SCORES_LIMIT);
            let sink: Arc<dyn MatchSink> = Arc::new(store);
            (sink, best)
        }
        None => {
            let sink: Arc<dyn MatchSink> = Arc::new(MatchHistory::new());
            (sink, Vec::new())
        }
    };

    let prefs = config.prefs_path.as_ref().map(PrefsStore::new);
    let rules = prefs.as_ref().map(PrefsStore::load).unwrap_or_default();

    let bell = Arc::new(TerminalBell::default());
    let (handle, task) = spawn(&config, Collaborators::new(sink, bell.clone()));

    let adapter = if ServerConfig::is_disabled() {
        tracing::info!("Adapter disabled via TILE_REFLEX_ADAPTER_DISABLED");
        None
    } else {
        let status = Arc::new(ServerStatus::default());
        let server = run_server(ServerConfig::from_env(), handle.clone(), status.clone(), None);
        rt.spawn(async move {
            if let Err(e) = server.await {
                tracing::warn!("Adapter stopped: {}", e);
            }
        });
        Some(status)
    };

    let mut session = Session {
        handle,
        bell,
        adapter,
        player_id: config.round.player_id.clone(),
        best,
        prefs,
        rules,
    };

    let mut term = TerminalRenderer::new();
    term.enter()?;
    let result = run(&mut term, &mut session);
    // Always try to restore terminal state.
    let _ = term.exit();

    session.handle.shutdown();
    let _ = rt.block_on(async { tokio::time::timeout(Duration::from_secs(1), task).await });
    drop(guard);
    rt.shutdown_timeout(Duration::from_millis(200));
    result
}

fn run(term: &mut TerminalRenderer, session: &mut Session) -> Result<()> {
    let view = GridView::default();
    let frame = Duration::from_millis(TICK_MS as u64);
    let mut snapshots = session.handle.subscribe();
    let mut results = session.handle.match_results();
    let mut show_rules = session.rules.should_show_rules();
    let mut rules_on_startup = session.rules.show_rules_on_startup;

    let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut fb = FrameBuffer::new(w, h);

    loop {
        while let Ok(result) = results.try_recv() {
            session.best.push(result);
            session.best = rank_top_scores(&session.best, &session.player_id, TOP_SCORES_LIMIT);
        }

        let snap = snapshots.borrow_and_update().clone();
        let panel = Panel {
            best: &session.best,
            show_rules,
            rules_on_startup,
            adapter_clients: session.adapter.as_ref().map(|s| s.client_count()),
        };
        let (w, h) = crossterm::terminal::size().unwrap_or((80, 24));
        view.render_into(&snap, &panel, Viewport::new(w, h), &mut fb);
        term.draw_swap(&mut fb)?;

        if session.bell.take() {
            term.bell()?;
        }

        if !event::poll(frame)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if should_quit(key) {
                    return Ok(());
                }
                if show_rules {
                    match handle_rules_key(key) {
                        RulesKey::ToggleStartup => rules_on_startup = !rules_on_startup,
                        RulesKey::Close => {
                            show_rules = false;
                            dismiss_rules(session, rules_on_startup);
                        }
                    }
                    continue;
                }
                if let Some(action) = handle_key_event(key) {
                    if action == InputAction::ShowRules {
                        show_rules = true;
                        rules_on_startup = session.rules.show_rules_on_startup;
                    }
                    for command in action.commands(snap.phase) {
                        session.handle.send(command);
                    }
                }
            }
            Event::Resize(..) => term.invalidate(),
            _ => {}
        }
    }
}

fn dismiss_rules(session: &mut Session, show_on_startup: bool) {
    session.rules.dismiss(show_on_startup);
    if let Some(store) = &session.prefs {
        if let Err(e) = store.save(&session.rules) {
            tracing::warn!("Failed to save preferences: {}", e);
        }
    }
}
