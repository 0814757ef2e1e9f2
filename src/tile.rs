//! Per-cell tile records and the occupancy registry.
//!
//! [`TileManager`] materializes one [`Tile`] per referenced grid cell on
//! first access and memoizes it for the life of the session — cells are
//! bounded in number and never garbage-collected. An auxiliary set of
//! occupied cells keeps occupancy queries O(1), and
//! [`TileManager::find_available_conversation_start`] performs the
//! deterministic search for free conversation territory.

#[cfg(test)]
#[path = "tile_test.rs"]
mod tile_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::consts::{CONVERSATION_PROBE_SPAN, CONVERSATION_ROW_WINDOW};
use crate::grid::{GridSystem, HexCoord};

/// What currently occupies a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupant {
    /// A chat message.
    Message,
    /// The message input affordance.
    Input,
    /// A typing indicator.
    Typing,
    /// An embedded website.
    Website,
}

/// One grid cell's record: identity, world position, and occupancy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: String,
    pub q: i32,
    pub r: i32,
    /// World x of the cell center, fixed at creation.
    pub x: f64,
    /// World y of the cell center, fixed at creation.
    pub y: f64,
    pub occupied: bool,
    pub occupant: Option<Occupant>,
    pub conversation_id: Option<String>,
}

/// Error parsing a canonical tile id string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TileIdError {
    /// The id does not have the `tile_<q>_<r>` shape.
    #[error("malformed tile id: {0:?}")]
    Malformed(String),
    /// A coordinate segment is not a valid integer.
    #[error("invalid coordinate in tile id: {0:?}")]
    InvalidCoordinate(String),
}

/// Canonical string key for the cell at `(q, r)`.
#[must_use]
pub fn tile_id(q: i32, r: i32) -> String {
    format!("tile_{q}_{r}")
}

/// Parse a canonical tile id back into its coordinates.
///
/// # Errors
///
/// Returns [`TileIdError`] when the id is not `tile_<q>_<r>` with integer
/// coordinates.
pub fn parse_tile_id(id: &str) -> Result<HexCoord, TileIdError> {
    let mut parts = id.splitn(3, '_');
    if parts.next() != Some("tile") {
        return Err(TileIdError::Malformed(id.to_string()));
    }
    let (Some(q_part), Some(r_part)) = (parts.next(), parts.next()) else {
        return Err(TileIdError::Malformed(id.to_string()));
    };
    let q = q_part
        .parse::<i32>()
        .map_err(|_| TileIdError::InvalidCoordinate(id.to_string()))?;
    let r = r_part
        .parse::<i32>()
        .map_err(|_| TileIdError::InvalidCoordinate(id.to_string()))?;
    Ok(HexCoord { q, r })
}

/// Registry of per-cell tiles with O(1) occupancy queries.
#[derive(Debug, Clone)]
pub struct TileManager {
    grid: GridSystem,
    tiles: HashMap<(i32, i32), Tile>,
    occupied: HashSet<(i32, i32)>,
    hovered: Option<HexCoord>,
    right_clicked: Option<HexCoord>,
}

impl TileManager {
    /// Build a registry over the given grid geometry.
    #[must_use]
    pub fn new(grid: GridSystem) -> Self {
        Self {
            grid,
            tiles: HashMap::new(),
            occupied: HashSet::new(),
            hovered: None,
            right_clicked: None,
        }
    }

    /// Number of tiles materialized so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns `true` if no tile has been materialized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// The tile at `(q, r)`, created and memoized on first access.
    pub fn get_tile(&mut self, q: i32, r: i32) -> &Tile {
        self.get_tile_mut(q, r)
    }

    /// The tile under a world position.
    pub fn tile_at_world(&mut self, x: f64, y: f64) -> &Tile {
        let coord = self.grid.world_to_grid(x, y);
        self.get_tile(coord.q, coord.r)
    }

    /// Mark a tile occupied.
    pub fn occupy_tile(
        &mut self,
        q: i32,
        r: i32,
        occupant: Occupant,
        conversation_id: Option<String>,
    ) -> &Tile {
        self.occupied.insert((q, r));
        let tile = self.get_tile_mut(q, r);
        tile.occupied = true;
        tile.occupant = Some(occupant);
        tile.conversation_id = conversation_id;
        tile
    }

    /// Clear a tile's occupancy.
    pub fn free_tile(&mut self, q: i32, r: i32) -> &Tile {
        self.occupied.remove(&(q, r));
        let tile = self.get_tile_mut(q, r);
        tile.occupied = false;
        tile.occupant = None;
        tile.conversation_id = None;
        tile
    }

    /// Whether the cell at `(q, r)` is occupied. Does not materialize it.
    #[must_use]
    pub fn is_tile_occupied(&self, q: i32, r: i32) -> bool {
        self.occupied.contains(&(q, r))
    }

    /// Record the hovered cell and return its tile.
    pub fn set_hovered_tile(&mut self, q: i32, r: i32) -> &Tile {
        self.hovered = Some(HexCoord { q, r });
        self.get_tile(q, r)
    }

    /// The most recently hovered tile, if any.
    #[must_use]
    pub fn hovered_tile(&self) -> Option<&Tile> {
        let coord = self.hovered?;
        self.tiles.get(&(coord.q, coord.r))
    }

    /// Record the right-clicked cell and return its tile.
    pub fn set_right_clicked_tile(&mut self, q: i32, r: i32) -> &Tile {
        self.right_clicked = Some(HexCoord { q, r });
        self.get_tile(q, r)
    }

    /// The most recently right-clicked tile, if any.
    #[must_use]
    pub fn right_clicked_tile(&self) -> Option<&Tile> {
        let coord = self.right_clicked?;
        self.tiles.get(&(coord.q, coord.r))
    }

    /// Find a free column pair for a new conversation near `target_q`.
    ///
    /// Conversations claim two adjacent columns `(2k, 2k + 1)`. Starting at
    /// the even column nearest the target, pairs are probed at growing
    /// offsets on both sides; a pair qualifies when the first
    /// [`CONVERSATION_ROW_WINDOW`] rows of both columns are free. Falls back
    /// to scanning every even column from 0, and finally to `(0, 0)` — the
    /// search always yields a coordinate, even when no territory is actually
    /// free, so callers needing that distinction must pre-check occupancy.
    #[must_use]
    pub fn find_available_conversation_start(&self, target_q: i32, _target_r: i32) -> HexCoord {
        let start_q = target_q.div_euclid(2) * 2;

        let mut offset = 0;
        while offset <= CONVERSATION_PROBE_SPAN {
            let test_q = start_q + offset;
            if test_q + 1 < self.grid.cols() && self.is_column_pair_free(test_q) {
                return HexCoord { q: test_q, r: 0 };
            }
            if offset > 0 {
                let test_q = start_q - offset;
                if test_q >= 0 && self.is_column_pair_free(test_q) {
                    return HexCoord { q: test_q, r: 0 };
                }
            }
            offset += 2;
        }

        let mut q = 0;
        while q < self.grid.cols() {
            if self.is_column_pair_free(q) {
                return HexCoord { q, r: 0 };
            }
            q += 2;
        }

        HexCoord { q: 0, r: 0 }
    }

    /// Tiles within `radius` cells of a center, by index distance.
    pub fn tiles_in_radius(&mut self, center_q: i32, center_r: i32, radius: i32) -> Vec<&Tile> {
        let mut coords = Vec::new();
        for q in (center_q - radius)..=(center_q + radius) {
            for r in (center_r - radius)..=(center_r + radius) {
                let dq = f64::from(q - center_q);
                let dr = f64::from(r - center_r);
                if (dq * dq + dr * dr).sqrt() <= f64::from(radius) {
                    self.get_tile(q, r);
                    coords.push((q, r));
                }
            }
        }
        coords.iter().filter_map(|key| self.tiles.get(key)).collect()
    }

    fn get_tile_mut(&mut self, q: i32, r: i32) -> &mut Tile {
        let grid = &self.grid;
        self.tiles.entry((q, r)).or_insert_with(|| {
            let world = grid.grid_to_world(q, r);
            Tile {
                id: tile_id(q, r),
                q,
                r,
                x: world.x,
                y: world.y,
                occupied: false,
                occupant: None,
                conversation_id: None,
            }
        })
    }

    fn is_column_pair_free(&self, q: i32) -> bool {
        for row in 0..CONVERSATION_ROW_WINDOW {
            if self.is_tile_occupied(q, row) || self.is_tile_occupied(q + 1, row) {
                return false;
            }
        }
        true
    }
}
