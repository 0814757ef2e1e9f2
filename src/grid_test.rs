#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn grid() -> GridSystem {
    GridSystem::default()
}

// --- Geometry constants ---

#[test]
fn default_dimensions() {
    let grid = grid();
    assert_eq!(grid.cols(), 32);
    assert_eq!(grid.rows(), 16);
    assert_eq!(grid.hex_size(), 180.0);
}

#[test]
fn hex_width_is_twice_size() {
    assert_eq!(grid().hex_width(), 360.0);
}

#[test]
fn hex_height_is_sqrt3_times_size() {
    assert!(approx_eq(grid().hex_height(), 3.0_f64.sqrt() * 180.0));
}

// --- grid_to_world ---

#[test]
fn origin_cell_maps_to_world_origin() {
    let world = grid().grid_to_world(0, 0);
    assert_eq!(world, WorldPoint::new(0.0, 0.0));
}

#[test]
fn odd_column_shifts_up_half_row() {
    let world = grid().grid_to_world(1, 0);
    assert!(approx_eq(world.x, 270.0));
    assert!(approx_eq(world.y, -(3.0_f64.sqrt() * 180.0) / 2.0));
}

#[test]
fn even_column_has_no_row_offset() {
    let world = grid().grid_to_world(2, 0);
    assert!(approx_eq(world.x, 540.0));
    assert!(approx_eq(world.y, 0.0));
}

#[test]
fn rows_advance_by_hex_height() {
    let grid = grid();
    let a = grid.grid_to_world(4, 3);
    let b = grid.grid_to_world(4, 4);
    assert!(approx_eq(b.y - a.y, grid.hex_height()));
    assert!(approx_eq(b.x, a.x));
}

#[test]
fn negative_odd_column_shifts_up_too() {
    let grid = grid();
    let world = grid.grid_to_world(-1, 0);
    assert!(approx_eq(world.x, -270.0));
    assert!(approx_eq(world.y, -grid.hex_height() / 2.0));
}

// --- world_to_grid ---

#[test]
fn world_origin_maps_to_origin_cell() {
    assert_eq!(grid().world_to_grid(0.0, 0.0), HexCoord::new(0, 0));
}

#[test]
fn small_offsets_round_to_nearest_cell() {
    let grid = grid();
    let center = grid.grid_to_world(3, 2);
    let coord = grid.world_to_grid(center.x + 50.0, center.y - 40.0);
    assert_eq!(coord, HexCoord::new(3, 2));
}

#[test]
fn round_trip_all_cells() {
    let grid = grid();
    for q in 0..grid.cols() {
        for r in 0..grid.rows() {
            let world = grid.grid_to_world(q, r);
            assert_eq!(
                grid.world_to_grid(world.x, world.y),
                HexCoord::new(q, r),
                "round trip failed at ({q}, {r})"
            );
        }
    }
}

#[test]
fn round_trip_outside_bounds() {
    let grid = grid();
    for &(q, r) in &[(-3, -2), (40, 20), (-1, 5), (33, 0)] {
        let world = grid.grid_to_world(q, r);
        assert_eq!(grid.world_to_grid(world.x, world.y), HexCoord::new(q, r));
    }
}

// --- is_valid_position ---

#[test]
fn corners_are_valid() {
    let grid = grid();
    assert!(grid.is_valid_position(0, 0));
    assert!(grid.is_valid_position(31, 15));
}

#[test]
fn out_of_range_is_invalid() {
    let grid = grid();
    assert!(!grid.is_valid_position(-1, 0));
    assert!(!grid.is_valid_position(0, -1));
    assert!(!grid.is_valid_position(32, 0));
    assert!(!grid.is_valid_position(0, 16));
}

// --- all_positions / bounds ---

#[test]
fn all_positions_covers_grid() {
    let grid = grid();
    let positions = grid.all_positions();
    assert_eq!(positions.len(), 32 * 16);
    assert_eq!(positions[0], HexCoord::new(0, 0));
    assert!(positions.contains(&HexCoord::new(31, 15)));
}

#[test]
fn bounds_expand_by_hex_size() {
    let grid = grid();
    let bounds = grid.bounds();
    let hex_height = grid.hex_height();
    assert!(approx_eq(bounds.min_x, -180.0));
    assert!(approx_eq(bounds.max_x, 31.0 * 270.0 + 180.0));
    assert!(approx_eq(bounds.min_y, -hex_height / 2.0 - 180.0));
    assert!(approx_eq(bounds.max_y, 15.0 * hex_height + 180.0));
}

#[test]
fn bounds_center_is_midpoint() {
    let bounds = grid().bounds();
    assert!(approx_eq(bounds.center_x, (bounds.min_x + bounds.max_x) / 2.0));
    assert!(approx_eq(bounds.center_y, (bounds.min_y + bounds.max_y) / 2.0));
    assert!(approx_eq(bounds.width, bounds.max_x - bounds.min_x));
    assert!(approx_eq(bounds.height, bounds.max_y - bounds.min_y));
}

// --- visible_positions ---

fn view(x: f64, y: f64, zoom: f64) -> ViewRect {
    ViewRect { x, y, zoom, screen_width: 1920.0, screen_height: 1080.0 }
}

#[test]
fn identity_view_sees_top_left_cells() {
    let visible = grid().visible_positions(&view(0.0, 0.0, 1.0));
    assert!(!visible.is_empty());
    assert!(visible.iter().any(|v| v.coord == HexCoord::new(0, 0)));
    // The far corner is thousands of pixels away and must be culled.
    assert!(!visible.iter().any(|v| v.coord == HexCoord::new(31, 15)));
}

#[test]
fn far_away_view_sees_nothing() {
    let visible = grid().visible_positions(&view(-100_000.0, -100_000.0, 1.0));
    assert!(visible.is_empty());
}

#[test]
fn zoomed_out_view_sees_whole_grid() {
    // At 0.1x the full grid (~8550 px wide) fits a 1920 px screen.
    let visible = grid().visible_positions(&view(400.0, 300.0, 0.1));
    assert_eq!(visible.len(), 32 * 16);
}

#[test]
fn visible_positions_carry_screen_coords() {
    let grid = grid();
    let rect = view(100.0, 50.0, 2.0);
    for position in grid.visible_positions(&rect) {
        assert!(approx_eq(position.screen_x, rect.x + position.world.x * rect.zoom));
        assert!(approx_eq(position.screen_y, rect.y + position.world.y * rect.zoom));
    }
}

#[test]
fn visibility_margin_is_one_hex() {
    let grid = grid();
    // Place the viewport so cell (0, 0) is just off the left edge but
    // inside the one-hex margin.
    let rect = view(-(grid.hex_size() - 1.0), 200.0, 1.0);
    let visible = grid.visible_positions(&rect);
    assert!(visible.iter().any(|v| v.coord == HexCoord::new(0, 0)));
}
