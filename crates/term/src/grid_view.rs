//! GridView: maps a `RoundSnapshot` into a terminal framebuffer.
//!
//! Pure (no I/O), so it can be unit-tested.

use crate::core::{MatchResult, RoundSnapshot, Tile};
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{PauseReason, Phase, TileKind, TILE_KEYS};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// Extra information drawn next to (or over) the grid.
#[derive(Debug, Clone, Copy, Default)]
pub struct Panel<'a> {
    /// Player's best rounds, best first.
    pub best: &'a [MatchResult],
    /// Draw the rules dialog over the grid.
    pub show_rules: bool,
    /// State of the dialog's "show on startup" checkbox.
    pub rules_on_startup: bool,
    /// Remote control adapter status, if running.
    pub adapter_clients: Option<usize>,
}

pub const RULES: [&str; 6] = [
    "RULES",
    "Tap green tiles before they vanish: +1",
    "Red tiles are hazards: tapping one costs a life",
    "Missing too many greens in a row costs a life",
    "Keys 1234 qwer asdf zxcv  Enter start",
    "p pause  Backspace reset  F1-F3 difficulty  ? rules",
];

const RULES_STARTUP_ON: &str = "[x] Show on startup (Space)";
const RULES_STARTUP_OFF: &str = "[ ] Show on startup (Space)";
const RULES_CLOSE: &str = "Press any other key to continue";

const BG: Rgb = Rgb::new(30, 30, 40);
const BLACK: Rgb = Rgb::new(0, 0, 0);

/// Terminal renderer for the tile grid.
pub struct GridView {
    /// Tile width in terminal columns.
    tile_w: u16,
    /// Tile height in terminal rows.
    tile_h: u16,
}

impl Default for GridView {
    fn default() -> Self {
        // 2:1 roughly squares the tile on typical terminal fonts.
        Self {
            tile_w: 6,
            tile_h: 3,
        }
    }
}

/// Columns of the most square grid holding `n` tiles.
pub fn grid_columns(n: usize) -> usize {
    let mut cols = 1;
    while cols * cols < n {
        cols += 1;
    }
    cols
}

impl GridView {
    pub fn new(tile_w: u16, tile_h: u16) -> Self {
        Self {
            tile_w: tile_w.max(3),
            tile_h: tile_h.max(1),
        }
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &RoundSnapshot,
        panel: &Panel<'_>,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.clear(CellStyle::default().cell(' '));

        let n = snap.tiles.len().max(1);
        let cols = grid_columns(n) as u16;
        let rows = n.div_ceil(cols as usize) as u16;

        let frame_w = cols * (self.tile_w + 1) + 1 + 2;
        let frame_h = rows * (self.tile_h + 1) + 1 + 2;
        let start_x = viewport.width.saturating_sub(frame_w + 24) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;

        fb.fill_rect(
            start_x + 1,
            start_y + 1,
            frame_w.saturating_sub(2),
            frame_h.saturating_sub(2),
            ' ',
            CellStyle::new(BG, BG),
        );
        draw_border(
            fb,
            start_x,
            start_y,
            frame_w,
            frame_h,
            CellStyle::new(Rgb::new(200, 200, 200), BLACK),
        );

        for (i, tile) in snap.tiles.iter().enumerate() {
            let col = i as u16 % cols;
            let row = i as u16 / cols;
            let x = start_x + 2 + col * (self.tile_w + 1);
            let y = start_y + 2 + row * (self.tile_h + 1);
            self.draw_tile(fb, x, y, tile);
        }

        self.draw_side_panel(fb, snap, panel, viewport, start_x + frame_w + 2, start_y);

        if panel.show_rules {
            draw_rules(fb, viewport, panel.rules_on_startup);
        } else if let Some(text) = overlay_text(snap.phase) {
            let x = start_x + frame_w.saturating_sub(text.len() as u16) / 2;
            let y = start_y + frame_h / 2;
            fb.put_str(x, y, text, CellStyle::new(Rgb::new(255, 255, 255), BLACK).bold());
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &RoundSnapshot, panel: &Panel<'_>, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, panel, viewport, &mut fb);
        fb
    }

    fn draw_tile(&self, fb: &mut FrameBuffer, x: u16, y: u16, tile: &Tile) {
        let (fill, label_style) = match (tile.revealed, tile.kind) {
            (true, TileKind::Reward) => {
                let s = CellStyle::new(BLACK, Rgb::new(90, 200, 110));
                (s, s.bold())
            }
            (true, TileKind::Hazard) => {
                let s = CellStyle::new(Rgb::new(255, 255, 255), Rgb::new(210, 70, 70));
                (s, s.bold())
            }
            _ => {
                let s = CellStyle::new(Rgb::new(110, 110, 125), Rgb::new(50, 50, 62));
                (s, s.dim())
            }
        };
        fb.fill_rect(x, y, self.tile_w, self.tile_h, ' ', fill);

        let mid_x = x + self.tile_w / 2;
        let mid_y = y + self.tile_h / 2;
        if let Some(&key) = TILE_KEYS.get(tile.id as usize) {
            fb.put_char(mid_x, mid_y, key.to_ascii_uppercase(), label_style);
        }
        if tile.revealed && tile.kind == TileKind::Hazard && self.tile_w >= 5 {
            fb.put_char(x + 1, mid_y, '!', label_style);
        }
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &RoundSnapshot,
        panel: &Panel<'_>,
        viewport: Viewport,
        x: u16,
        start_y: u16,
    ) {
        if x.saturating_add(12) > viewport.width {
            return;
        }

        let label = CellStyle::default().bold();
        let value = CellStyle::default();
        let dim = value.dim();

        let mut y = start_y;
        fb.put_str(x, y, "SCORE", label);
        fb.put_u64(x, y + 1, snap.score as u64, value);
        y += 3;

        fb.put_str(x, y, "LIVES", label);
        let heart = CellStyle::new(Rgb::new(230, 80, 90), BLACK);
        for i in 0..snap.lives.min(10) as u16 {
            fb.put_char(x + i * 2, y + 1, '♥', heart);
        }
        y += 3;

        fb.put_str(x, y, "TIME", label);
        let secs = snap.elapsed_ms / 1000;
        let tenths = (snap.elapsed_ms % 1000) / 100;
        let cx = fb.put_u64(x, y + 1, secs, value);
        let cx = fb.put_str(cx, y + 1, ".", value);
        let cx = fb.put_u64(cx, y + 1, tenths, value);
        fb.put_char(cx, y + 1, 's', value);
        y += 3;

        fb.put_str(x, y, "LEVEL", label);
        fb.put_str(x, y + 1, snap.difficulty.as_str(), value);
        y += 3;

        fb.put_str(x, y, "MISSES", label);
        let cx = fb.put_u64(x, y + 1, snap.consecutive_misses as u64, value);
        let cx = fb.put_str(cx, y + 1, "/", dim);
        fb.put_u64(cx, y + 1, snap.difficulty.profile().miss_threshold as u64, dim);
        y += 3;

        if !panel.best.is_empty() {
            fb.put_str(x, y, "BEST", label);
            for (i, m) in panel.best.iter().enumerate() {
                let cx = fb.put_u64(x, y + 1 + i as u16, i as u64 + 1, dim);
                let cx = fb.put_str(cx, y + 1 + i as u16, ". ", dim);
                fb.put_u64(cx, y + 1 + i as u16, m.score as u64, value);
            }
            y += panel.best.len() as u16 + 2;
        }

        fb.put_str(x, y, "REMOTE", label);
        match panel.adapter_clients {
            Some(n) => {
                let cx = fb.put_str(x, y + 1, "ON ", value);
                fb.put_u64(cx, y + 1, n as u64, dim);
            }
            None => {
                fb.put_str(x, y + 1, "OFF", dim);
            }
        }
    }
}

fn overlay_text(phase: Phase) -> Option<&'static str> {
    match phase {
        Phase::Ready => Some("PRESS ENTER"),
        Phase::Playing => None,
        Phase::Paused(PauseReason::Manual) => Some("PAUSED"),
        Phase::Paused(PauseReason::Penalty) => Some("OUCH!"),
        Phase::Over => Some("GAME OVER"),
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16, style: CellStyle) {
    if w < 2 || h < 2 {
        return;
    }
    fb.put_char(x, y, '┌', style);
    fb.put_char(x + w - 1, y, '┐', style);
    fb.put_char(x, y + h - 1, '└', style);
    fb.put_char(x + w - 1, y + h - 1, '┘', style);
    for dx in 1..w - 1 {
        fb.put_char(x + dx, y, '─', style);
        fb.put_char(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put_char(x, y + dy, '│', style);
        fb.put_char(x + w - 1, y + dy, '│', style);
    }
}

fn draw_rules(fb: &mut FrameBuffer, viewport: Viewport, on_startup: bool) {
    let inner_w = RULES.iter().map(|l| l.len() as u16).max().unwrap_or(0) + 4;
    let w = inner_w + 2;
    let h = RULES.len() as u16 + 7;
    let x = viewport.width.saturating_sub(w) / 2;
    let y = viewport.height.saturating_sub(h) / 2;

    let style = CellStyle::new(Rgb::new(230, 230, 230), Rgb::new(20, 20, 30));
    fb.fill_rect(x, y, w, h, ' ', style);
    draw_border(fb, x, y, w, h, style);
    for (i, line) in RULES.iter().enumerate() {
        let s = if i == 0 { style.bold() } else { style };
        fb.put_str(x + 3, y + 2 + i as u16, line, s);
    }

    let footer_y = y + 3 + RULES.len() as u16;
    let checkbox = if on_startup {
        RULES_STARTUP_ON
    } else {
        RULES_STARTUP_OFF
    };
    fb.put_str(x + 3, footer_y, checkbox, style);
    fb.put_str(x + 3, footer_y + 1, RULES_CLOSE, style.dim());
}
