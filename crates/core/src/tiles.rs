//! Tile set - fixed-size ordered collection of tile slots
//!
//! Backed by a stack-allocated `ArrayVec` so snapshots and rebuilds never allocate.

use arrayvec::ArrayVec;

use crate::types::{TileId, TileKind, DEFAULT_TILE_COUNT, MAX_TILES};

/// One tile slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile {
    pub id: TileId,
    pub kind: TileKind,
    pub revealed: bool,
}

impl Tile {
    pub fn new(id: TileId) -> Self {
        Self {
            id,
            kind: TileKind::None,
            revealed: false,
        }
    }
}

/// Scratch list of tile ids.
pub type TileIds = ArrayVec<TileId, MAX_TILES>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    tiles: ArrayVec<Tile, MAX_TILES>,
}

impl TileSet {
    /// Create `count` hidden tiles with ids `0..count` (clamped to `1..=MAX_TILES`).
    pub fn new(count: u8) -> Self {
        let count = (count as usize).clamp(1, MAX_TILES);
        let mut tiles = ArrayVec::new();
        for id in 0..count {
            tiles.push(Tile::new(id as TileId));
        }
        Self { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(id as usize)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn as_slice(&self) -> &[Tile] {
        &self.tiles
    }

    /// Reveal a hidden tile with `kind`. Returns false for unknown or already revealed tiles.
    pub fn reveal(&mut self, id: TileId, kind: TileKind) -> bool {
        match self.tiles.get_mut(id as usize) {
            Some(tile) if !tile.revealed => {
                tile.kind = kind;
                tile.revealed = true;
                true
            }
            _ => false,
        }
    }

    /// Hide a revealed tile, returning it as it was before hiding.
    ///
    /// The kind stays on the tile until the next rebuild.
    pub fn hide(&mut self, id: TileId) -> Option<Tile> {
        match self.tiles.get_mut(id as usize) {
            Some(tile) if tile.revealed => {
                let before = *tile;
                tile.revealed = false;
                Some(before)
            }
            _ => None,
        }
    }

    pub fn is_revealed(&self, id: TileId) -> bool {
        self.get(id).map(|t| t.revealed).unwrap_or(false)
    }

    /// Write the ids of all hidden tiles into `out` (cleared first).
    pub fn hidden_ids_into(&self, out: &mut TileIds) {
        out.clear();
        out.extend(self.tiles.iter().filter(|t| !t.revealed).map(|t| t.id));
    }

    pub fn revealed_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.revealed).count()
    }

    /// Reset every tile to hidden with no symbol.
    pub fn rebuild(&mut self) {
        for tile in self.tiles.iter_mut() {
            *tile = Tile::new(tile.id);
        }
    }
}

impl Default for TileSet {
    fn default() -> Self {
        Self::new(DEFAULT_TILE_COUNT)
    }
}
