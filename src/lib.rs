//! Interaction engine for a hexagonal chat canvas.
//!
//! The crate computes the state underneath a UI that arranges conversation
//! messages and embedded content as hexagonal tiles on an infinite
//! pannable/zoomable surface: coordinate conversions between grid, world,
//! and screen space, an inertial pan/zoom animation loop, tile occupancy
//! and conversation territory tracking, and a dual-axis level-of-detail
//! state machine. Drawing is the consumer's job — a rendering layer reads
//! the published [`viewport::ViewState`] and [`lod::LodState`] each frame,
//! and an input layer translates raw device events into the calls exposed
//! here.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | Per-canvas composition root owning one of each manager |
//! | [`grid`] | Hex grid geometry and grid↔world conversions |
//! | [`viewport`] | Pan/zoom transform, world↔screen conversions, constraints |
//! | [`animation`] | Inertial animation loop and the [`animation::Scheduler`] frame abstraction |
//! | [`tile`] | Per-cell tile records, occupancy, conversation-start search |
//! | [`tile_grid`] | Durable data tiles vs ephemeral UI tiles, position and conversation indices |
//! | [`conversation`] | Conversation records and message placement |
//! | [`lod`] | Context/zoom level-of-detail state machine |
//! | [`consts`] | Shared numeric constants (zoom limits, decay rates, etc.) |

pub mod animation;
pub mod consts;
pub mod conversation;
pub mod grid;
pub mod lod;
pub mod session;
pub mod tile;
pub mod tile_grid;
pub mod viewport;
