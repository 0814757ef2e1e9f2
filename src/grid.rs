//! Hex grid model: coordinate spaces and conversions.
//!
//! Three coordinate spaces cooperate here:
//!
//! 1. Grid space: integer hex coordinates `(q, r)` on a bounded
//!    rectangular layout (columns × rows).
//! 2. World space: continuous pixel coordinates in the infinite world.
//!    Tiles have fixed world positions.
//! 3. Screen space: pixel coordinates on the viewport, related to world
//!    space by the current pan/zoom transform (see [`crate::viewport`]).
//!
//! The layout is offset-column hex tiling: columns are `1.5 * hex_size`
//! apart, rows are `sqrt(3) * hex_size` apart, and odd columns are shifted
//! up by half a row.

#[cfg(test)]
#[path = "grid_test.rs"]
mod grid_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS, DEFAULT_HEX_SIZE};

/// Integer address of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    #[must_use]
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }
}

/// A point in continuous world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldPoint {
    pub x: f64,
    pub y: f64,
}

impl WorldPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// World-space bounding box of the whole grid, expanded by one hex size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

/// Pan/zoom and screen extent needed to cull the grid to what's on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRect {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
    pub screen_width: f64,
    pub screen_height: f64,
}

/// A grid cell visible in the current viewport, with its position in all
/// three coordinate spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisiblePosition {
    pub coord: HexCoord,
    pub world: WorldPoint,
    pub screen_x: f64,
    pub screen_y: f64,
}

/// Hex grid geometry and coordinate conversions.
///
/// Conversion functions never enforce grid bounds; [`GridSystem::is_valid_position`]
/// is advisory and callers choose whether to honor it.
#[derive(Debug, Clone)]
pub struct GridSystem {
    hex_size: f64,
    cols: i32,
    rows: i32,
    spacing_x: f64,
    spacing_y: f64,
    bounds: GridBounds,
}

impl GridSystem {
    /// Build a grid with the given hexagon circumradius and dimensions.
    #[must_use]
    pub fn new(hex_size: f64, cols: i32, rows: i32) -> Self {
        let spacing_x = hex_size * 1.5;
        let spacing_y = 3.0_f64.sqrt() * hex_size;
        let mut grid = Self {
            hex_size,
            cols,
            rows,
            spacing_x,
            spacing_y,
            bounds: GridBounds {
                min_x: 0.0,
                max_x: 0.0,
                min_y: 0.0,
                max_y: 0.0,
                width: 0.0,
                height: 0.0,
                center_x: 0.0,
                center_y: 0.0,
            },
        };
        grid.bounds = grid.calculate_bounds();
        grid
    }

    /// Hexagon circumradius in world pixels.
    #[must_use]
    pub fn hex_size(&self) -> f64 {
        self.hex_size
    }

    /// Hexagon width (point-to-point) in world pixels.
    #[must_use]
    pub fn hex_width(&self) -> f64 {
        self.hex_size * 2.0
    }

    /// Hexagon height (flat-to-flat) in world pixels.
    #[must_use]
    pub fn hex_height(&self) -> f64 {
        self.spacing_y
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Number of rows.
    #[must_use]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// World-space bounding box of the grid.
    #[must_use]
    pub fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Convert grid coordinates to the world position of the cell center.
    ///
    /// Odd columns are shifted up by half a row. Valid for any integers,
    /// including cells outside the configured bounds.
    #[must_use]
    pub fn grid_to_world(&self, q: i32, r: i32) -> WorldPoint {
        let x = f64::from(q) * self.spacing_x;
        let y = f64::from(r) * self.spacing_y
            + f64::from(q.rem_euclid(2)) * (-self.spacing_y / 2.0);
        WorldPoint { x, y }
    }

    /// Convert a world position to the nearest grid cell.
    ///
    /// The column is resolved first; the row offset depends on its parity.
    #[must_use]
    pub fn world_to_grid(&self, x: f64, y: f64) -> HexCoord {
        #[allow(clippy::cast_possible_truncation)]
        let q = (x / self.spacing_x).round() as i32;
        let offset = f64::from(q.rem_euclid(2)) * (-self.spacing_y / 2.0);
        #[allow(clippy::cast_possible_truncation)]
        let r = ((y - offset) / self.spacing_y).round() as i32;
        HexCoord { q, r }
    }

    /// Whether the cell lies within the configured grid rectangle.
    #[must_use]
    pub fn is_valid_position(&self, q: i32, r: i32) -> bool {
        q >= 0 && q < self.cols && r >= 0 && r < self.rows
    }

    /// Every cell of the grid in column-major order.
    #[must_use]
    pub fn all_positions(&self) -> Vec<HexCoord> {
        let mut positions = Vec::with_capacity((self.cols * self.rows).unsigned_abs() as usize);
        for q in 0..self.cols {
            for r in 0..self.rows {
                positions.push(HexCoord { q, r });
            }
        }
        positions
    }

    /// Cells whose center falls inside the viewport's world rect, expanded
    /// by one hex size of margin, with world and screen positions attached.
    ///
    /// Scans the full grid: O(cols × rows) per call. Acceptable for bounded
    /// grids; an unbounded grid would need spatial indexing instead.
    #[must_use]
    pub fn visible_positions(&self, view: &ViewRect) -> Vec<VisiblePosition> {
        let world_left = -view.x / view.zoom;
        let world_right = (view.screen_width - view.x) / view.zoom;
        let world_top = -view.y / view.zoom;
        let world_bottom = (view.screen_height - view.y) / view.zoom;
        let margin = self.hex_size;

        let mut visible = Vec::new();
        for q in 0..self.cols {
            for r in 0..self.rows {
                let world = self.grid_to_world(q, r);
                if world.x >= world_left - margin
                    && world.x <= world_right + margin
                    && world.y >= world_top - margin
                    && world.y <= world_bottom + margin
                {
                    visible.push(VisiblePosition {
                        coord: HexCoord { q, r },
                        world,
                        screen_x: view.x + world.x * view.zoom,
                        screen_y: view.y + world.y * view.zoom,
                    });
                }
            }
        }
        visible
    }

    fn calculate_bounds(&self) -> GridBounds {
        let mut min_x = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for pos in self.all_positions() {
            let world = self.grid_to_world(pos.q, pos.r);
            min_x = min_x.min(world.x);
            max_x = max_x.max(world.x);
            min_y = min_y.min(world.y);
            max_y = max_y.max(world.y);
        }
        min_x -= self.hex_size;
        max_x += self.hex_size;
        min_y -= self.hex_size;
        max_y += self.hex_size;
        GridBounds {
            min_x,
            max_x,
            min_y,
            max_y,
            width: max_x - min_x,
            height: max_y - min_y,
            center_x: (min_x + max_x) / 2.0,
            center_y: (min_y + max_y) / 2.0,
        }
    }
}

impl Default for GridSystem {
    fn default() -> Self {
        Self::new(DEFAULT_HEX_SIZE, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS)
    }
}
