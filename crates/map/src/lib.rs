//! Level map: the tile grid rays are cast against.
//!
//! # Invariants
//! - Border cells are always walls, so no ray can leave the grid unhit.
//! - The grid is immutable after load except for door open/close, and every
//!   such mutation is recorded as a [`MapEvent`].

mod cell;
mod grid;
mod parse;

pub use cell::{Cell, CellKind, DEFAULT_DOOR_MATERIAL, DEFAULT_SOLID_MATERIAL};
pub use grid::{Map, MapBuilder, MapError, MapEvent};

pub fn crate_info() -> &'static str {
    "duskcast-map v0.1.0"
}
