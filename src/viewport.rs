//! Viewport state: the world↔screen transform and its constraints.
//!
//! [`ViewState`] is the affine transform from world to screen space:
//! `screen = world * zoom + (x, y)`. [`ViewportSystem`] owns the current
//! transform and screen dimensions, converts between the two spaces, and
//! keeps the view inside its zoom and pan-distance constraints. Consumers
//! that need the current transform read it from here — it is never
//! re-derived from rendered output.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_PAN_DISTANCE, MAX_ZOOM, MIN_ZOOM};
use crate::grid::{GridBounds, GridSystem, ViewRect, WorldPoint};

/// Pan offset and zoom factor mapping world space onto the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Screen-space x of the world origin.
    pub x: f64,
    /// Screen-space y of the world origin.
    pub y: f64,
    /// Scale factor, always within the configured zoom range.
    pub zoom: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0, zoom: 1.0 }
    }
}

/// Sparse update for a [`ViewState`]. Only present fields are applied.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ViewStatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f64>,
}

/// Size of the screen the view is projected onto, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenDimensions {
    pub width: f64,
    pub height: f64,
}

impl Default for ScreenDimensions {
    fn default() -> Self {
        Self { width: 1920.0, height: 1080.0 }
    }
}

/// Limits on how far the view may zoom and pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConstraints {
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Maximum distance from the grid-centering offset at zoom 1; scaled by
    /// the current zoom before enforcement.
    pub max_pan_distance: f64,
}

impl Default for ViewportConstraints {
    fn default() -> Self {
        Self {
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            max_pan_distance: MAX_PAN_DISTANCE,
        }
    }
}

/// World-space rectangle covered by the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub width: f64,
    pub height: f64,
}

/// Full viewport snapshot handed to consumers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportInfo {
    pub view: ViewState,
    pub screen: ScreenDimensions,
    pub world_bounds: WorldBounds,
    pub grid_bounds: GridBounds,
}

/// Owns the current pan/zoom transform and screen dimensions.
#[derive(Debug, Clone)]
pub struct ViewportSystem {
    view_state: ViewState,
    screen: ScreenDimensions,
    constraints: ViewportConstraints,
    grid_bounds: GridBounds,
}

impl ViewportSystem {
    /// Build a viewport constrained to the given grid's bounds.
    #[must_use]
    pub fn new(grid: &GridSystem) -> Self {
        Self {
            view_state: ViewState::default(),
            screen: ScreenDimensions::default(),
            constraints: ViewportConstraints::default(),
            grid_bounds: grid.bounds(),
        }
    }

    /// The current transform.
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    /// The current screen dimensions.
    #[must_use]
    pub fn screen_dimensions(&self) -> ScreenDimensions {
        self.screen
    }

    /// The active constraints.
    #[must_use]
    pub fn constraints(&self) -> ViewportConstraints {
        self.constraints
    }

    /// Merge a sparse update into the view state, then enforce constraints.
    pub fn update_view_state(&mut self, patch: ViewStatePatch) {
        if let Some(x) = patch.x {
            self.view_state.x = x;
        }
        if let Some(y) = patch.y {
            self.view_state.y = y;
        }
        if let Some(zoom) = patch.zoom {
            self.view_state.zoom = zoom;
        }
        self.enforce_constraints();
    }

    /// Record a new screen size.
    pub fn update_screen_dimensions(&mut self, width: f64, height: f64) {
        self.screen = ScreenDimensions { width, height };
    }

    /// Convert a screen point to world coordinates.
    #[must_use]
    pub fn screen_to_world(&self, screen_x: f64, screen_y: f64) -> WorldPoint {
        WorldPoint {
            x: (screen_x - self.view_state.x) / self.view_state.zoom,
            y: (screen_y - self.view_state.y) / self.view_state.zoom,
        }
    }

    /// Convert a world point to screen coordinates.
    #[must_use]
    pub fn world_to_screen(&self, world: WorldPoint) -> (f64, f64) {
        (
            self.view_state.x + world.x * self.view_state.zoom,
            self.view_state.y + world.y * self.view_state.zoom,
        )
    }

    /// Full snapshot: transform, screen size, and both bounds.
    #[must_use]
    pub fn viewport_info(&self) -> ViewportInfo {
        ViewportInfo {
            view: self.view_state,
            screen: self.screen,
            world_bounds: self.world_bounds(),
            grid_bounds: self.grid_bounds,
        }
    }

    /// The culling rect consumed by [`GridSystem::visible_positions`].
    #[must_use]
    pub fn view_rect(&self) -> ViewRect {
        ViewRect {
            x: self.view_state.x,
            y: self.view_state.y,
            zoom: self.view_state.zoom,
            screen_width: self.screen.width,
            screen_height: self.screen.height,
        }
    }

    /// World-space rectangle currently covered by the screen.
    #[must_use]
    pub fn world_bounds(&self) -> WorldBounds {
        let top_left = self.screen_to_world(0.0, 0.0);
        let bottom_right = self.screen_to_world(self.screen.width, self.screen.height);
        WorldBounds {
            left: top_left.x,
            right: bottom_right.x,
            top: top_left.y,
            bottom: bottom_right.y,
            width: bottom_right.x - top_left.x,
            height: bottom_right.y - top_left.y,
        }
    }

    /// Offset the view so the grid's center lands at screen center at the
    /// current zoom.
    pub fn center_on_grid(&mut self) {
        let zoom = self.view_state.zoom;
        self.update_view_state(ViewStatePatch {
            x: Some(self.screen.width / 2.0 - self.grid_bounds.center_x * zoom),
            y: Some(self.screen.height / 2.0 - self.grid_bounds.center_y * zoom),
            zoom: None,
        });
    }

    /// Shift the view by a screen-space delta.
    pub fn pan(&mut self, delta_x: f64, delta_y: f64) {
        self.update_view_state(ViewStatePatch {
            x: Some(self.view_state.x + delta_x),
            y: Some(self.view_state.y + delta_y),
            zoom: None,
        });
    }

    /// Zoom to `new_zoom` keeping the world point under `(screen_x, screen_y)`
    /// visually stationary.
    pub fn zoom_around(&mut self, new_zoom: f64, screen_x: f64, screen_y: f64) {
        let pivot = self.screen_to_world(screen_x, screen_y);
        let zoom = new_zoom.clamp(self.constraints.min_zoom, self.constraints.max_zoom);
        self.update_view_state(ViewStatePatch {
            x: Some(screen_x - pivot.x * zoom),
            y: Some(screen_y - pivot.y * zoom),
            zoom: Some(zoom),
        });
    }

    /// Clamp zoom, then pull the offset back toward the grid-centering ideal
    /// when it has strayed farther than the pan-distance limit. The excess is
    /// scaled along its own direction — never snapped — so an active drag
    /// keeps its feel.
    pub fn enforce_constraints(&mut self) {
        self.view_state.zoom = self
            .view_state
            .zoom
            .clamp(self.constraints.min_zoom, self.constraints.max_zoom);

        let ideal_x = self.screen.width / 2.0 - self.grid_bounds.center_x * self.view_state.zoom;
        let ideal_y = self.screen.height / 2.0 - self.grid_bounds.center_y * self.view_state.zoom;

        let delta_x = self.view_state.x - ideal_x;
        let delta_y = self.view_state.y - ideal_y;
        let distance = (delta_x * delta_x + delta_y * delta_y).sqrt();
        let max_distance = self.constraints.max_pan_distance * self.view_state.zoom;

        if distance > max_distance {
            let ratio = max_distance / distance;
            self.view_state.x = ideal_x + delta_x * ratio;
            self.view_state.y = ideal_y + delta_y * ratio;
        }
    }
}
