//! Conversation records and message placement.
//!
//! A conversation claims a column pair `(2k, 2k + 1)` as its territory and
//! lays messages out alternating left/right, advancing one row per pair.
//! [`ConversationManager`] owns the conversation records and the
//! message→conversation index; the occupancy side effects go through the
//! [`TileManager`] the caller passes in.

#[cfg(test)]
#[path = "conversation_test.rs"]
mod conversation_test;

use std::collections::HashMap;

use tracing::info;
use uuid::Uuid;

use crate::grid::HexCoord;
use crate::tile::{Occupant, TileManager};

/// Error from conversation creation or message placement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    /// The conversation id is unknown.
    #[error("conversation not found: {0}")]
    NotFound(String),
    /// The requested column pair is already claimed.
    #[error("territory occupied at columns {start_q}-{end_q}, row {row}")]
    TerritoryOccupied { start_q: i32, end_q: i32, row: i32 },
    /// The next slot in the conversation layout is already taken.
    #[error("position ({q}, {r}) is occupied")]
    PositionOccupied { q: i32, r: i32 },
}

/// One conversation thread and its territory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    pub id: String,
    /// Even column anchoring the claimed pair.
    pub start_q: i32,
    /// Row of the first message.
    pub start_r: i32,
    /// Messages in arrival order; index determines layout position.
    pub message_ids: Vec<String>,
}

/// Result of a successful conversation creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationStart {
    pub conversation_id: String,
    pub position: HexCoord,
}

/// Registry of conversations and the active lock.
#[derive(Debug, Clone, Default)]
pub struct ConversationManager {
    conversations: HashMap<String, Conversation>,
    message_to_conversation: HashMap<String, String>,
    active_conversation_id: Option<String>,
}

impl ConversationManager {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation at the clicked cell's column pair, seeding it
    /// with `message_id`.
    ///
    /// The clicked column is rounded down to its even pair anchor. The pair
    /// must not be claimed by an existing conversation and both of its
    /// tiles on the clicked row must be free.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::TerritoryOccupied`] when the pair is
    /// taken.
    pub fn create_conversation(
        &mut self,
        tiles: &mut TileManager,
        clicked_q: i32,
        clicked_r: i32,
        message_id: &str,
    ) -> Result<ConversationStart, ConversationError> {
        let start_q = clicked_q.div_euclid(2) * 2;

        let pair_claimed = self
            .conversations
            .values()
            .any(|conversation| conversation.start_q == start_q);
        if pair_claimed
            || tiles.is_tile_occupied(start_q, clicked_r)
            || tiles.is_tile_occupied(start_q + 1, clicked_r)
        {
            return Err(ConversationError::TerritoryOccupied {
                start_q,
                end_q: start_q + 1,
                row: clicked_r,
            });
        }

        let conversation_id = format!("conv_{}", Uuid::new_v4());
        self.conversations.insert(
            conversation_id.clone(),
            Conversation {
                id: conversation_id.clone(),
                start_q,
                start_r: clicked_r,
                message_ids: vec![message_id.to_string()],
            },
        );
        self.message_to_conversation
            .insert(message_id.to_string(), conversation_id.clone());
        tiles.occupy_tile(start_q, clicked_r, Occupant::Message, Some(conversation_id.clone()));

        info!(%conversation_id, start_q, start_r = clicked_r, "conversation created");
        Ok(ConversationStart {
            conversation_id,
            position: HexCoord { q: start_q, r: clicked_r },
        })
    }

    /// Append a message to a conversation at its next layout slot and
    /// occupy that tile.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::NotFound`] for unknown conversations and
    /// [`ConversationError::PositionOccupied`] when the slot is taken.
    pub fn add_message(
        &mut self,
        tiles: &mut TileManager,
        conversation_id: &str,
        message_id: &str,
    ) -> Result<HexCoord, ConversationError> {
        let Some(conversation) = self.conversations.get_mut(conversation_id) else {
            return Err(ConversationError::NotFound(conversation_id.to_string()));
        };

        let position = layout_position(
            conversation.start_q,
            conversation.start_r,
            conversation.message_ids.len(),
        );
        if tiles.is_tile_occupied(position.q, position.r) {
            return Err(ConversationError::PositionOccupied { q: position.q, r: position.r });
        }

        conversation.message_ids.push(message_id.to_string());
        self.message_to_conversation
            .insert(message_id.to_string(), conversation_id.to_string());
        tiles.occupy_tile(
            position.q,
            position.r,
            Occupant::Message,
            Some(conversation_id.to_string()),
        );
        Ok(position)
    }

    /// Lock to a conversation for input display. Returns `false` for
    /// unknown ids.
    pub fn lock_to(&mut self, conversation_id: &str) -> bool {
        if !self.conversations.contains_key(conversation_id) {
            return false;
        }
        self.active_conversation_id = Some(conversation_id.to_string());
        info!(conversation_id, "conversation locked");
        true
    }

    /// Clear the active conversation.
    pub fn unlock(&mut self) {
        self.active_conversation_id = None;
    }

    /// The currently locked conversation, if any.
    #[must_use]
    pub fn active_conversation_id(&self) -> Option<&str> {
        self.active_conversation_id.as_deref()
    }

    /// The anchor column of the active conversation, if any.
    #[must_use]
    pub fn active_conversation_q(&self) -> Option<i32> {
        let id = self.active_conversation_id.as_deref()?;
        self.conversations.get(id).map(|c| c.start_q)
    }

    /// Look up a conversation by id.
    #[must_use]
    pub fn conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.get(conversation_id)
    }

    /// The conversation a message belongs to, if tracked.
    #[must_use]
    pub fn conversation_for_message(&self, message_id: &str) -> Option<&Conversation> {
        let conversation_id = self.message_to_conversation.get(message_id)?;
        self.conversations.get(conversation_id)
    }

    /// Where the input affordance belongs: the active conversation's next
    /// layout slot, or `(0, 0)` when nothing is active.
    #[must_use]
    pub fn input_position(&self) -> HexCoord {
        let Some(id) = self.active_conversation_id.as_deref() else {
            return HexCoord { q: 0, r: 0 };
        };
        let Some(conversation) = self.conversations.get(id) else {
            return HexCoord { q: 0, r: 0 };
        };
        layout_position(
            conversation.start_q,
            conversation.start_r,
            conversation.message_ids.len(),
        )
    }

    /// A message's layout position: its tracked slot, or the legacy
    /// alternating layout at columns 0/1 derived from `fallback_index`.
    #[must_use]
    pub fn message_position(&self, message_id: &str, fallback_index: usize) -> HexCoord {
        if let Some(conversation) = self.conversation_for_message(message_id) {
            if let Some(index) = conversation
                .message_ids
                .iter()
                .position(|id| id == message_id)
            {
                return layout_position(conversation.start_q, conversation.start_r, index);
            }
        }
        layout_position(0, 0, fallback_index)
    }
}

/// Slot `index` of the alternating left/right, row-pair conversation layout
/// anchored at `(start_q, start_r)`.
fn layout_position(start_q: i32, start_r: i32, index: usize) -> HexCoord {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let index = index as i32;
    let column = if index % 2 == 0 { 0 } else { 1 };
    HexCoord {
        q: start_q + column,
        r: start_r + index / 2,
    }
}
