//! Session root: one instance of every manager, explicitly composed.
//!
//! [`CanvasSession`] replaces module-level singletons with owned instances
//! so multiple independent canvases can coexist and tests get deterministic
//! state. It wires the engine's data flow: input entry points feed the
//! animation manager, each frame tick forwards the published view state
//! into the viewport system (the single source of truth for readers) and
//! the LoD manager's zoom axis, and the lock flows coordinate animation,
//! conversation registry, and LoD together.
//!
//! Everything is single-threaded and synchronous: input events and frame
//! ticks run to completion one at a time, so state is always observed
//! fully settled between calls.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use tracing::{debug, info};

use crate::animation::AnimationManager;
use crate::consts::{CONVERSATION_FOCUS_ZOOM, MESSAGE_FOCUS_ZOOM};
use crate::conversation::{ConversationError, ConversationManager};
use crate::grid::{GridSystem, HexCoord, VisiblePosition};
use crate::lod::{ContextLevel, LoDManager, LodState, PanMode, context_config};
use crate::tile::TileManager;
use crate::tile_grid::TileGrid;
use crate::viewport::{ViewState, ViewStatePatch, ViewportSystem};

/// Grid geometry for a new session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub hex_size: f64,
    pub cols: i32,
    pub rows: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let grid = GridSystem::default();
        Self {
            hex_size: grid.hex_size(),
            cols: grid.cols(),
            rows: grid.rows(),
        }
    }
}

/// Owns every manager of one canvas.
pub struct CanvasSession {
    pub grid: GridSystem,
    pub viewport: ViewportSystem,
    pub tiles: TileManager,
    pub tile_grid: TileGrid,
    pub conversations: ConversationManager,
    pub lod: LoDManager,
    pub animation: AnimationManager,
}

impl CanvasSession {
    /// Build a session with the given grid geometry.
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let grid = GridSystem::new(config.hex_size, config.cols, config.rows);
        let viewport = ViewportSystem::new(&grid);
        let tiles = TileManager::new(grid.clone());
        let animation = AnimationManager::new(ViewState::default(), Box::new(|_| {}));
        Self {
            grid,
            viewport,
            tiles,
            tile_grid: TileGrid::new(),
            conversations: ConversationManager::new(),
            lod: LoDManager::new(),
            animation,
        }
    }

    /// The current view transform, read from the viewport system.
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        self.viewport.view_state()
    }

    /// The current LoD snapshot.
    #[must_use]
    pub fn lod_state(&self) -> LodState {
        self.lod.current_state()
    }

    /// Grid cells currently on screen.
    #[must_use]
    pub fn visible_positions(&self) -> Vec<VisiblePosition> {
        self.grid.visible_positions(&self.viewport.view_rect())
    }

    /// Record a new screen size.
    pub fn set_screen_dimensions(&mut self, width: f64, height: f64) {
        self.viewport.update_screen_dimensions(width, height);
    }

    /// Advance one animation frame and propagate the published view state.
    /// Returns whether another frame is needed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        let running = self.animation.tick(now_ms);
        let view = self.animation.view_state();
        self.apply_view(view);

        // The hard horizontal lock engages once the lock fly-to has settled;
        // engaging earlier would freeze the flight itself.
        if self.lod.is_locked() && !running && !self.animation.is_locked() {
            self.animation.set_locked(true);
        }
        running
    }

    /// Begin a drag: kill any in-flight fling so the pointer takes over.
    pub fn begin_drag(&mut self) {
        self.animation.set_initial_velocity(0.0, 0.0);
    }

    /// Move the view by a screen-space drag delta, honoring the current
    /// context's pan mode.
    pub fn drag_by(&mut self, delta_x: f64, delta_y: f64) {
        let view = match context_config(self.lod.context_level()).allow_panning {
            PanMode::Free => self.animation.update_position(delta_x, delta_y),
            PanMode::Vertical => self.animation.update_position(0.0, delta_y),
            PanMode::None => return,
        };
        self.apply_view(view);
    }

    /// Release a drag with a fling velocity in pixels per reference frame.
    pub fn release_drag(&mut self, velocity_x: f64, velocity_y: f64) {
        match context_config(self.lod.context_level()).allow_panning {
            PanMode::Free => self.animation.set_initial_velocity(velocity_x, velocity_y),
            PanMode::Vertical => self.animation.set_initial_velocity(0.0, velocity_y),
            PanMode::None => {}
        }
    }

    /// Ease the zoom toward `new_zoom` around a screen point. Ignored when
    /// the current context forbids zooming.
    pub fn zoom_to(&mut self, new_zoom: f64, screen_x: f64, screen_y: f64) {
        if !context_config(self.lod.context_level()).allow_zooming {
            debug!("zoom ignored: context forbids zooming");
            return;
        }
        let constraints = self.viewport.constraints();
        let target = new_zoom.clamp(constraints.min_zoom, constraints.max_zoom);
        self.animation.set_zoom(target, screen_x, screen_y);
    }

    /// Lock onto a conversation: fly the view to its column span at
    /// conversation-focus zoom and switch the LoD context.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::NotFound`] when the conversation has no
    /// data tiles to center on.
    pub fn lock_to_conversation(
        &mut self,
        conversation_id: &str,
        message_id: Option<&str>,
        clicked: HexCoord,
    ) -> Result<(), ConversationError> {
        if self.tile_grid.get_conversation_tiles(conversation_id).is_empty() {
            return Err(ConversationError::NotFound(conversation_id.to_string()));
        }
        // Switching targets while locked: release the old lock first so the
        // new fly-to is free to move.
        if self.lod.context_level() != ContextLevel::Workspace {
            self.unlock();
        }

        let members = self.tile_grid.get_conversation_tiles(conversation_id);
        let mut min_q = clicked.q;
        let mut max_q = clicked.q;
        for tile in &members {
            min_q = min_q.min(tile.position.q);
            max_q = max_q.max(tile.position.q);
        }

        // Row 0 keeps the x centering free of the odd-column offset.
        let left = self.grid.grid_to_world(min_q, 0);
        let right = self.grid.grid_to_world(max_q, 0);
        let center_x = (left.x + right.x) / 2.0;
        let center_y = self.grid.grid_to_world(min_q, clicked.r).y;

        let screen = self.viewport.screen_dimensions();
        let (screen_cx, screen_cy) = (screen.width / 2.0, screen.height / 2.0);
        let target = ViewState {
            x: screen_cx - center_x * CONVERSATION_FOCUS_ZOOM,
            y: screen_cy - center_y * CONVERSATION_FOCUS_ZOOM,
            zoom: CONVERSATION_FOCUS_ZOOM,
        };
        self.animation.set_zoom(CONVERSATION_FOCUS_ZOOM, screen_cx, screen_cy);
        self.animation.set_view_state(target);

        if !self.conversations.lock_to(conversation_id) {
            debug!(conversation_id, "conversation not in registry; view lock only");
        }
        self.lod.lock_to_conversation(conversation_id, message_id);
        info!(conversation_id, "locked to conversation");
        Ok(())
    }

    /// Expand a message to the viewport: fly to its cell at message-focus
    /// zoom. Returns `false` (and moves nothing) outside conversation
    /// context.
    pub fn focus_message(&mut self, message_id: &str, at: HexCoord) -> bool {
        if self.lod.context_level() != ContextLevel::Conversation {
            return false;
        }
        let center = self.grid.grid_to_world(at.q, at.r);
        let screen = self.viewport.screen_dimensions();
        let (screen_cx, screen_cy) = (screen.width / 2.0, screen.height / 2.0);
        let target = ViewState {
            x: screen_cx - center.x * MESSAGE_FOCUS_ZOOM,
            y: screen_cy - center.y * MESSAGE_FOCUS_ZOOM,
            zoom: MESSAGE_FOCUS_ZOOM,
        };
        self.animation.set_zoom(MESSAGE_FOCUS_ZOOM, screen_cx, screen_cy);
        self.animation.set_view_state(target);
        self.lod.expand_to_message(message_id);
        true
    }

    /// Step back from message focus to the conversation.
    pub fn return_to_conversation(&mut self) {
        self.lod.return_to_conversation();
    }

    /// Release every lock and return to free workspace navigation.
    pub fn unlock(&mut self) {
        self.animation.set_locked(false);
        self.conversations.unlock();
        self.lod.return_to_workspace();
        info!("unlocked to workspace");
    }

    /// Hard-reset the view to the origin at zoom 1.
    pub fn reset_view(&mut self) {
        let view = self.animation.reset();
        self.apply_view(view);
    }

    fn apply_view(&mut self, view: ViewState) {
        self.viewport.update_view_state(ViewStatePatch {
            x: Some(view.x),
            y: Some(view.y),
            zoom: Some(view.zoom),
        });
        self.lod.update_zoom(self.viewport.view_state().zoom);
    }
}

impl Default for CanvasSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
