//! Ray casting against the level grid.
//!
//! One ray per screen column is stepped cell by cell (exact DDA) until it
//! enters a solid cell. The result per column is a [`HitResult`] collected in
//! a reusable [`DistanceBuffer`], which is also the depth buffer the
//! billboard pass tests against.
//!
//! # Invariants
//! - Stored distances are perpendicular (fisheye corrected): the raw ray
//!   length times the cosine of the column's angle off the view direction.
//! - A ray never indexes outside the grid. Leaving the grid, or travelling
//!   past `max_depth`, reports a miss at `max_depth`.
//! - Batch casting gives the same result as casting each column alone.

mod batch;
mod caster;
mod hit;

pub use caster::{RayCaster, RaycastError, column_angle};
pub use hit::{DistanceBuffer, HitResult};

pub fn crate_info() -> &'static str {
    "duskcast-raycast v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("raycast"));
    }
}
