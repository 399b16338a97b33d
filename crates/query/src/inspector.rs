use duskcast_common::EntityId;
use duskcast_spatial::{CellCoord, SpatialGrid};
use glam::Vec2;

/// Spatial grid inspector for developer tooling.
///
/// Read-only queries for debugging and profiling the entity index.
pub struct GridInspector;

impl GridInspector {
    /// Produce a summary of the grid's occupancy.
    pub fn summary(grid: &SpatialGrid) -> GridSummary {
        let busiest_cell = grid
            .occupied_cells()
            .map(|(coord, ids)| (coord, ids.len()))
            .max_by_key(|&(coord, n)| (n, std::cmp::Reverse((coord.x, coord.y))));
        GridSummary {
            cell_size: grid.cell_size(),
            entity_count: grid.len(),
            occupied_cells: grid.cell_count(),
            placements: grid.total_placements(),
            busiest_cell,
            bounds: grid.bounds(),
            consistent: grid.check_invariants().is_ok(),
        }
    }

    /// Position and cell of a tracked entity.
    pub fn inspect_entity(grid: &SpatialGrid, id: EntityId) -> Option<GridEntityInfo> {
        grid.position(id).map(|position| GridEntityInfo {
            id,
            position,
            cell: grid.position_to_cell(position),
        })
    }

    /// All tracked entity ids, sorted.
    pub fn list_entities(grid: &SpatialGrid) -> Vec<EntityId> {
        let mut ids: Vec<EntityId> = grid.entities().map(|(id, _)| id).collect();
        ids.sort();
        ids
    }
}

/// Occupancy summary for the inspector.
#[derive(Debug, Clone)]
pub struct GridSummary {
    pub cell_size: f32,
    pub entity_count: usize,
    pub occupied_cells: usize,
    pub placements: usize,
    /// Most populated cell and its population.
    pub busiest_cell: Option<(CellCoord, usize)>,
    pub bounds: Option<(CellCoord, CellCoord)>,
    /// Whether every entity sits in exactly one, correct cell.
    pub consistent: bool,
}

impl GridSummary {
    /// Average occupants per non-empty cell.
    pub fn mean_occupancy(&self) -> f32 {
        if self.occupied_cells == 0 {
            0.0
        } else {
            self.placements as f32 / self.occupied_cells as f32
        }
    }
}

impl std::fmt::Display for GridSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Grid: cell_size={} entities={} cells={} mean={:.2}",
            self.cell_size,
            self.entity_count,
            self.occupied_cells,
            self.mean_occupancy()
        )?;
        if let Some((coord, n)) = self.busiest_cell {
            write!(f, " busiest=({}, {})x{}", coord.x, coord.y, n)?;
        }
        if !self.consistent {
            write!(f, " INCONSISTENT")?;
        }
        Ok(())
    }
}

/// Detailed info about a single tracked entity.
#[derive(Debug, Clone)]
pub struct GridEntityInfo {
    pub id: EntityId,
    pub position: Vec2,
    pub cell: CellCoord,
}

impl std::fmt::Display for GridEntityInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Entity [{:.8}] pos=({:.2}, {:.2}) cell=({}, {})",
            &self.id.0.to_string()[..8],
            self.position.x,
            self.position.y,
            self.cell.x,
            self.cell.y,
        )
    }
}
