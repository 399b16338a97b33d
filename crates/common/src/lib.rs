//! Shared types and utilities for the duskcast core.
//!
//! Everything here is plain data: identifiers, the player pose, colours
//! and the engine configuration.

mod config;
mod types;

pub use config::{ConfigError, EngineConfig, Theme};
pub use types::{EntityId, Pose, Rgba, Side};

/// Smallest distance used before dividing by a distance.
pub const DISTANCE_EPSILON: f32 = 1e-3;

pub fn crate_info() -> &'static str {
    "duskcast-common v0.1.0"
}
