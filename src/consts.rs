//! Shared numeric constants for the hexboard engine.

// ── Grid geometry ───────────────────────────────────────────────

/// Default hexagon circumradius in world pixels.
pub const DEFAULT_HEX_SIZE: f64 = 180.0;

/// Default grid width in columns.
pub const DEFAULT_GRID_COLS: i32 = 32;

/// Default grid height in rows.
pub const DEFAULT_GRID_ROWS: i32 = 16;

// ── Viewport constraints ────────────────────────────────────────

/// Smallest allowed zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest allowed zoom factor.
pub const MAX_ZOOM: f64 = 3.0;

/// Maximum pan distance from the grid-centering offset, in screen pixels
/// at zoom 1. Scaled by the current zoom before enforcement.
pub const MAX_PAN_DISTANCE: f64 = 2000.0;

// ── Animation ───────────────────────────────────────────────────

/// Reference frame duration in milliseconds. Velocities are expressed in
/// pixels per reference frame, independent of the actual frame rate.
pub const BASE_FRAME_MS: f64 = 16.66;

/// Per-reference-frame velocity retention factor.
pub const VELOCITY_DECAY: f64 = 0.92;

/// Velocity magnitude below which the pan is considered at rest.
pub const REST_VELOCITY: f64 = 0.05;

/// Zoom gap below which the zoom snaps to its target.
pub const ZOOM_SNAP_EPSILON: f64 = 0.001;

/// Fraction of the remaining zoom gap closed per tick.
pub const ZOOM_EASE_RATE: f64 = 0.12;

/// Fraction of the remaining offset injected as velocity by a fly-to.
pub const FLY_TO_RATE: f64 = 0.15;

// ── Level of detail ─────────────────────────────────────────────

/// Zoom values below this are the overview band.
pub const OVERVIEW_MAX_ZOOM: f64 = 0.6;

/// Zoom values below this (and at or above the overview ceiling) are the
/// normal band; everything above is the detail band.
pub const NORMAL_MAX_ZOOM: f64 = 1.5;

/// Zoom applied when locking the view onto a conversation.
pub const CONVERSATION_FOCUS_ZOOM: f64 = 1.8;

/// Zoom applied when expanding a single message.
pub const MESSAGE_FOCUS_ZOOM: f64 = 2.5;

// ── Conversation layout ─────────────────────────────────────────

/// Rows checked for occupancy when probing a column pair for a new
/// conversation.
pub const CONVERSATION_ROW_WINDOW: i32 = 6;

/// Farthest column offset probed on either side of the requested start
/// before falling back to a full scan.
pub const CONVERSATION_PROBE_SPAN: i32 = 20;
