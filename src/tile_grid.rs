//! Dual-registry tile store: durable data tiles and ephemeral UI tiles.
//!
//! [`DataTile`]s carry real content (messages, documents) and participate in
//! the conversation index; [`UiTile`]s are interaction affordances (input,
//! typing indicator) that never persist. Both share one position index so
//! occupancy queries are agnostic of tile kind. Conversation membership
//! preserves insertion order — the first tile of a conversation anchors its
//! column pair and seed row for all later placement.

#[cfg(test)]
#[path = "tile_grid_test.rs"]
mod tile_grid_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::grid::HexCoord;

/// Kind of durable content a data tile holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataTileKind {
    Message,
    Document,
}

/// Kind of interaction affordance a UI tile represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiTileKind {
    Input,
    Typing,
    Selection,
}

/// Durable content tile. Part of server state; survives the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTile {
    pub id: String,
    pub kind: DataTileKind,
    /// Open-ended content payload (message body, author, timestamps, …).
    pub data: serde_json::Value,
    pub position: HexCoord,
    pub conversation_id: Option<String>,
}

impl DataTile {
    /// Build a data tile, lifting `conversationId` out of the payload when
    /// present.
    #[must_use]
    pub fn new(id: String, kind: DataTileKind, data: serde_json::Value, position: HexCoord) -> Self {
        let conversation_id = data
            .get("conversationId")
            .and_then(|v| v.as_str())
            .map(String::from);
        Self { id, kind, data, position, conversation_id }
    }

    /// Data tiles are saved to the server.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        true
    }
}

/// Ephemeral interface tile. Never saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiTile {
    pub id: String,
    pub kind: UiTileKind,
    pub position: HexCoord,
    /// UI-specific metadata (placeholder text, animation hints, …).
    pub metadata: serde_json::Value,
    pub is_visible: bool,
}

impl UiTile {
    #[must_use]
    pub fn new(id: String, kind: UiTileKind, position: HexCoord, metadata: serde_json::Value) -> Self {
        Self { id, kind, position, metadata, is_visible: true }
    }

    /// UI tiles are never saved to the server.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        false
    }
}

/// Reference to a tile of either kind at some position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileRef<'a> {
    Data(&'a DataTile),
    Ui(&'a UiTile),
}

impl TileRef<'_> {
    /// The tile's id regardless of kind.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Data(tile) => &tile.id,
            Self::Ui(tile) => &tile.id,
        }
    }

    /// The tile's position regardless of kind.
    #[must_use]
    pub fn position(&self) -> HexCoord {
        match self {
            Self::Data(tile) => tile.position,
            Self::Ui(tile) => tile.position,
        }
    }
}

/// Store of both tile kinds with position and conversation indices.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    data_tiles: HashMap<String, DataTile>,
    ui_tiles: HashMap<String, UiTile>,
    position_index: HashMap<(i32, i32), HashSet<String>>,
    conversation_index: HashMap<String, Vec<String>>,
}

impl TileGrid {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a data tile. Re-inserting an existing id replaces the old
    /// tile and its index entries.
    pub fn add_data_tile(&mut self, tile: DataTile) {
        if self.data_tiles.contains_key(&tile.id) {
            self.remove_tile(&tile.id);
        }
        self.index_position(&tile.id, tile.position);
        if let Some(conversation_id) = &tile.conversation_id {
            self.conversation_index
                .entry(conversation_id.clone())
                .or_default()
                .push(tile.id.clone());
        }
        self.data_tiles.insert(tile.id.clone(), tile);
    }

    /// Insert a UI tile. Re-inserting an existing id replaces the old tile
    /// and its index entries.
    pub fn add_ui_tile(&mut self, tile: UiTile) {
        if self.ui_tiles.contains_key(&tile.id) {
            self.remove_tile(&tile.id);
        }
        self.index_position(&tile.id, tile.position);
        self.ui_tiles.insert(tile.id.clone(), tile);
    }

    /// Remove a tile of either kind. Returns `false` for unknown ids.
    pub fn remove_tile(&mut self, id: &str) -> bool {
        if let Some(tile) = self.data_tiles.remove(id) {
            if let Some(conversation_id) = &tile.conversation_id {
                if let Some(members) = self.conversation_index.get_mut(conversation_id) {
                    members.retain(|member| member != id);
                    if members.is_empty() {
                        self.conversation_index.remove(conversation_id);
                    }
                }
            }
            self.unindex_position(id, tile.position);
            return true;
        }
        if let Some(tile) = self.ui_tiles.remove(id) {
            self.unindex_position(id, tile.position);
            return true;
        }
        false
    }

    /// Look up a data tile by id.
    #[must_use]
    pub fn data_tile(&self, id: &str) -> Option<&DataTile> {
        self.data_tiles.get(id)
    }

    /// Look up a UI tile by id.
    #[must_use]
    pub fn ui_tile(&self, id: &str) -> Option<&UiTile> {
        self.ui_tiles.get(id)
    }

    /// Whether any tile (of either kind) sits at `(q, r)`.
    #[must_use]
    pub fn is_position_occupied(&self, q: i32, r: i32) -> bool {
        self.position_index
            .get(&(q, r))
            .is_some_and(|ids| !ids.is_empty())
    }

    /// Every tile at `(q, r)`, both kinds.
    #[must_use]
    pub fn get_tiles_at_position(&self, q: i32, r: i32) -> Vec<TileRef<'_>> {
        let Some(ids) = self.position_index.get(&(q, r)) else {
            return Vec::new();
        };
        ids.iter()
            .filter_map(|id| {
                self.data_tiles
                    .get(id)
                    .map(TileRef::Data)
                    .or_else(|| self.ui_tiles.get(id).map(TileRef::Ui))
            })
            .collect()
    }

    /// Data tiles of a conversation in insertion order.
    #[must_use]
    pub fn get_conversation_tiles(&self, conversation_id: &str) -> Vec<&DataTile> {
        let Some(ids) = self.conversation_index.get(conversation_id) else {
            return Vec::new();
        };
        ids.iter().filter_map(|id| self.data_tiles.get(id)).collect()
    }

    /// Even column starts currently claimed as conversation territory,
    /// derived from all data-tile positions.
    #[must_use]
    pub fn occupied_column_pairs(&self) -> HashSet<i32> {
        self.data_tiles
            .values()
            .map(|tile| tile.position.q.div_euclid(2) * 2)
            .collect()
    }

    /// Whether the column pair containing `q` is free for a new
    /// conversation.
    #[must_use]
    pub fn is_column_pair_available(&self, q: i32) -> bool {
        !self.occupied_column_pairs().contains(&(q.div_euclid(2) * 2))
    }

    /// Where the next data tile of a conversation belongs: alternating
    /// left/right column, advancing one row per pair — the same layout used
    /// when the conversation was seeded. `None` for unknown conversations.
    #[must_use]
    pub fn next_conversation_position(&self, conversation_id: &str) -> Option<HexCoord> {
        let tiles = self.get_conversation_tiles(conversation_id);
        let first = tiles.first()?;
        let start_q = first.position.q.div_euclid(2) * 2;
        let start_r = first.position.r;

        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let count = tiles.len() as i32;
        let column = if count % 2 == 0 { 0 } else { 1 };
        Some(HexCoord {
            q: start_q + column,
            r: start_r + count / 2,
        })
    }

    /// Every tile, for rendering layers: `(data, ui)`.
    #[must_use]
    pub fn all_tiles(&self) -> (Vec<&DataTile>, Vec<&UiTile>) {
        (
            self.data_tiles.values().collect(),
            self.ui_tiles.values().collect(),
        )
    }

    fn index_position(&mut self, id: &str, position: HexCoord) {
        self.position_index
            .entry((position.q, position.r))
            .or_default()
            .insert(id.to_string());
    }

    fn unindex_position(&mut self, id: &str, position: HexCoord) {
        if let Some(ids) = self.position_index.get_mut(&(position.q, position.r)) {
            ids.remove(id);
            if ids.is_empty() {
                self.position_index.remove(&(position.q, position.r));
            }
        }
    }
}
