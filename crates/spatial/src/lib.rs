//! Spatial indexing: a uniform hash grid over entity positions.
//!
//! # Invariants
//! - Every tracked entity id sits in exactly one cell bucket: the cell that
//!   contains its current position.
//! - Bucketing is an optimisation only; range queries return exactly what a
//!   brute-force scan would.

mod grid;

pub use grid::{CellCoord, SpatialError, SpatialGrid};

pub fn crate_info() -> &'static str {
    "duskcast-spatial v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("spatial"));
    }
}
