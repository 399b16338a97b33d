//! Queries game logic and the renderer ask of the spatial grid.
//!
//! [`EntityQueryFacade`] answers "what is near the player" questions;
//! [`GridInspector`] produces read-only diagnostics.

mod facade;
mod inspector;

pub use facade::{EntityQueryFacade, normalize_angle};
pub use inspector::{GridEntityInfo, GridInspector, GridSummary};

pub fn crate_info() -> &'static str {
    "duskcast-query v0.1.0"
}
