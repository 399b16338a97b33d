use std::collections::{HashMap, HashSet};

use duskcast_common::EntityId;
use glam::Vec2;

/// A 2D cell coordinate in the spatial grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Broken grid bookkeeping, reported by [`SpatialGrid::check_invariants`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpatialError {
    #[error("entity {id:?} is tracked in {count} cells")]
    DuplicatePlacement { id: EntityId, count: usize },
    #[error("entity {id:?} is in cell {cell:?} but has no recorded position")]
    Orphaned { id: EntityId, cell: CellCoord },
    #[error("entity {id:?} is filed under {actual:?} but its position maps to {expected:?}")]
    Misfiled {
        id: EntityId,
        expected: CellCoord,
        actual: CellCoord,
    },
    #[error("entity {id:?} has a recorded position but is in no cell")]
    Missing { id: EntityId },
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    pos: Vec2,
    cell: CellCoord,
}

/// Uniform hash grid mapping cells to the entity ids inside them.
///
/// Unlike a per-frame rebuild, entities are maintained incrementally:
/// callers insert once, then report every movement through
/// [`SpatialGrid::move_entity`].
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellCoord, HashSet<EntityId>>,
    placements: HashMap<EntityId, Placement>,
    /// Inclusive extent of the occupied cells; clips ring searches.
    bounds: Option<(CellCoord, CellCoord)>,
}

impl SpatialGrid {
    /// Create an empty grid with the given cell size.
    pub fn new(cell_size: f32) -> Self {
        assert!(
            cell_size.is_finite() && cell_size > 0.0,
            "cell_size must be positive"
        );
        Self {
            cell_size,
            cells: HashMap::new(),
            placements: HashMap::new(),
            bounds: None,
        }
    }

    /// Cell size used for this grid.
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Convert a world position to a cell coordinate.
    pub fn position_to_cell(&self, pos: Vec2) -> CellCoord {
        CellCoord {
            x: (pos.x / self.cell_size).floor() as i32,
            y: (pos.y / self.cell_size).floor() as i32,
        }
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.placements.contains_key(&id)
    }

    /// Last reported position of a tracked entity.
    pub fn position(&self, id: EntityId) -> Option<Vec2> {
        self.placements.get(&id).map(|p| p.pos)
    }

    /// Remove every entity.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.placements.clear();
        self.bounds = None;
    }

    /// Replace the contents with the given entities.
    pub fn rebuild(&mut self, entities: impl IntoIterator<Item = (EntityId, Vec2)>) {
        self.clear();
        for (id, pos) in entities {
            self.insert(id, pos);
        }
    }

    /// Start tracking an entity. Inserting an already tracked id moves it.
    pub fn insert(&mut self, id: EntityId, pos: Vec2) {
        if let Some(old) = self.placements.get(&id).map(|p| p.pos) {
            tracing::debug!(?id, "insert of tracked entity treated as move");
            self.move_entity(id, old, pos);
            return;
        }
        let cell = self.position_to_cell(pos);
        self.attach(id, cell);
        self.placements.insert(id, Placement { pos, cell });
        self.debug_check(id);
    }

    /// Move a tracked entity from `old_pos` to `new_pos`.
    ///
    /// Removal from the old cell and insertion into the new one happen
    /// together; when both positions share a cell only the stored position
    /// changes. The tracked cell is authoritative: a stale `old_pos` is
    /// logged and ignored. Untracked ids are inserted.
    pub fn move_entity(&mut self, id: EntityId, old_pos: Vec2, new_pos: Vec2) {
        let Some(placement) = self.placements.get(&id).copied() else {
            tracing::debug!(?id, "move of untracked entity treated as insert");
            self.insert(id, new_pos);
            return;
        };

        if self.position_to_cell(old_pos) != placement.cell {
            tracing::warn!(
                ?id,
                reported = ?old_pos,
                tracked = ?placement.pos,
                "stale old position in move, using tracked cell"
            );
        }

        let new_cell = self.position_to_cell(new_pos);
        if new_cell != placement.cell {
            self.detach(id, placement.cell);
            self.attach(id, new_cell);
        }
        self.placements.insert(
            id,
            Placement {
                pos: new_pos,
                cell: new_cell,
            },
        );
        self.debug_check(id);
    }

    /// Stop tracking an entity. Returns its last position.
    pub fn remove(&mut self, id: EntityId) -> Option<Vec2> {
        let placement = self.placements.remove(&id)?;
        self.detach(id, placement.cell);
        self.debug_check(id);
        Some(placement.pos)
    }

    /// All entities within `radius` (inclusive) of `center`, in no
    /// particular order.
    pub fn query_radius(&self, center: Vec2, radius: f32) -> Vec<EntityId> {
        let mut out = Vec::new();
        self.query_radius_into(center, radius, &mut out);
        out
    }

    /// Like [`SpatialGrid::query_radius`] but appends into a reusable buffer.
    pub fn query_radius_into(&self, center: Vec2, radius: f32, out: &mut Vec<EntityId>) {
        let Some((lo_bound, hi_bound)) = self.bounds else {
            return;
        };
        if radius.is_nan() || radius < 0.0 {
            return;
        }
        let lo = self.position_to_cell(center - Vec2::splat(radius));
        let hi = self.position_to_cell(center + Vec2::splat(radius));
        let (x0, x1) = (lo.x.max(lo_bound.x), hi.x.min(hi_bound.x));
        let (y0, y1) = (lo.y.max(lo_bound.y), hi.y.min(hi_bound.y));
        let r2 = radius * radius;
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let Some(bucket) = self.cells.get(&CellCoord::new(cx, cy)) else {
                    continue;
                };
                for id in bucket {
                    if self.placements[id].pos.distance_squared(center) <= r2 {
                        out.push(*id);
                    }
                }
            }
        }
    }

    /// The entity closest to `center`, if any.
    pub fn nearest(&self, center: Vec2) -> Option<EntityId> {
        self.nearest_where(center, |_| true)
    }

    /// The closest entity accepted by `predicate`.
    ///
    /// Searches rings of cells outward from the centre cell and stops once no
    /// remaining ring can hold anything closer than the best candidate. When
    /// the rings have covered more cells than are occupied, the remaining
    /// search scans the entities directly. Ties resolve to the smaller id.
    pub fn nearest_where(
        &self,
        center: Vec2,
        mut predicate: impl FnMut(EntityId) -> bool,
    ) -> Option<EntityId> {
        let (lo, hi) = self.bounds?;
        let c = self.position_to_cell(center);
        let (cx, cy) = (i64::from(c.x), i64::from(c.y));
        let (lo_x, lo_y) = (i64::from(lo.x), i64::from(lo.y));
        let (hi_x, hi_y) = (i64::from(hi.x), i64::from(hi.y));

        // Rings closer than the occupied extent are empty, rings past it too.
        let first_ring = (lo_x - cx).max(cx - hi_x).max(lo_y - cy).max(cy - hi_y).max(0);
        let last_ring = (cx - lo_x).max(hi_x - cx).max(cy - lo_y).max(hi_y - cy);

        let mut best: Option<(f32, EntityId)> = None;
        let mut scanned = 0usize;
        for k in first_ring..=last_ring {
            if let Some((best_d2, _)) = best {
                // Every cell in ring k is at least (k - 1) cells away.
                let floor = (k - 1) as f32 * self.cell_size;
                if floor > 0.0 && floor * floor > best_d2 {
                    break;
                }
            }
            scanned += self.for_each_in_ring((cx, cy), k, (lo, hi), |id, pos| {
                if predicate(id) {
                    keep_closer(&mut best, id, pos.distance_squared(center));
                }
            });
            if scanned > self.cells.len() && k < last_ring {
                return self.nearest_by_scan(center, predicate);
            }
        }
        best.map(|(_, id)| id)
    }

    /// Exhaustive form of [`SpatialGrid::nearest_where`] for sparse grids.
    fn nearest_by_scan(
        &self,
        center: Vec2,
        mut predicate: impl FnMut(EntityId) -> bool,
    ) -> Option<EntityId> {
        let mut best: Option<(f32, EntityId)> = None;
        for (id, placement) in &self.placements {
            if predicate(*id) {
                keep_closer(&mut best, *id, placement.pos.distance_squared(center));
            }
        }
        best.map(|(_, id)| id)
    }

    /// Entities in the 3x3 block of cells around `center`.
    pub fn get_nearby(&self, center: Vec2) -> Vec<EntityId> {
        let c = self.position_to_cell(center);
        let mut out = Vec::new();
        for dy in -1..=1 {
            for dx in -1..=1 {
                if let Some(bucket) = self.cells.get(&CellCoord::new(c.x + dx, c.y + dy)) {
                    out.extend(bucket.iter().copied());
                }
            }
        }
        out
    }

    /// Get all entity IDs in a specific cell.
    pub fn entities_in_cell(&self, coord: CellCoord) -> HashSet<EntityId> {
        self.cells.get(&coord).cloned().unwrap_or_default()
    }

    /// Every tracked entity with its last position, in no particular order.
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, Vec2)> + '_ {
        self.placements.iter().map(|(id, p)| (*id, p.pos))
    }

    /// Non-empty cells with their occupants.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (CellCoord, &HashSet<EntityId>)> {
        self.cells.iter().map(|(c, ids)| (*c, ids))
    }

    /// Inclusive extent of the occupied cells.
    pub fn bounds(&self) -> Option<(CellCoord, CellCoord)> {
        self.bounds
    }

    /// Number of non-empty cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Total number of entity placements across all cells.
    pub fn total_placements(&self) -> usize {
        self.cells.values().map(|s| s.len()).sum()
    }

    /// Verify that every tracked id is filed in exactly the cell of its
    /// position and nowhere else.
    pub fn check_invariants(&self) -> Result<(), SpatialError> {
        let mut seen: HashMap<EntityId, (CellCoord, usize)> = HashMap::new();
        for (cell, bucket) in &self.cells {
            for id in bucket {
                let entry = seen.entry(*id).or_insert((*cell, 0));
                entry.1 += 1;
                if entry.1 > 1 {
                    return Err(SpatialError::DuplicatePlacement {
                        id: *id,
                        count: entry.1,
                    });
                }
            }
        }
        for (id, (cell, _)) in &seen {
            let Some(placement) = self.placements.get(id) else {
                return Err(SpatialError::Orphaned {
                    id: *id,
                    cell: *cell,
                });
            };
            let expected = self.position_to_cell(placement.pos);
            if expected != *cell || placement.cell != *cell {
                return Err(SpatialError::Misfiled {
                    id: *id,
                    expected,
                    actual: *cell,
                });
            }
        }
        if let Some(id) = self.placements.keys().find(|id| !seen.contains_key(id)) {
            return Err(SpatialError::Missing { id: *id });
        }
        Ok(())
    }

    /// Verify a single entity's filing: its recorded cell matches its
    /// position and that cell lists it. Untracked ids pass.
    pub fn check_entity(&self, id: EntityId) -> Result<(), SpatialError> {
        let Some(placement) = self.placements.get(&id) else {
            return Ok(());
        };
        let expected = self.position_to_cell(placement.pos);
        if placement.cell != expected {
            return Err(SpatialError::Misfiled {
                id,
                expected,
                actual: placement.cell,
            });
        }
        match self.cells.get(&placement.cell) {
            Some(bucket) if bucket.contains(&id) => Ok(()),
            _ => Err(SpatialError::Missing { id }),
        }
    }

    #[inline]
    fn debug_check(&self, id: EntityId) {
        #[cfg(debug_assertions)]
        if let Err(err) = self.check_entity(id) {
            panic!("spatial grid invariant broken: {err}");
        }
        #[cfg(not(debug_assertions))]
        let _ = id;
    }

    fn attach(&mut self, id: EntityId, cell: CellCoord) {
        let fresh = self.cells.entry(cell).or_default().insert(id);
        debug_assert!(fresh, "entity {id:?} already filed in {cell:?}");
        self.bounds = Some(match self.bounds {
            None => (cell, cell),
            Some((lo, hi)) => (
                CellCoord::new(lo.x.min(cell.x), lo.y.min(cell.y)),
                CellCoord::new(hi.x.max(cell.x), hi.y.max(cell.y)),
            ),
        });
    }

    fn detach(&mut self, id: EntityId, cell: CellCoord) {
        let removed = match self.cells.get_mut(&cell) {
            Some(bucket) => {
                let removed = bucket.remove(&id);
                if bucket.is_empty() {
                    self.cells.remove(&cell);
                    if self.on_boundary(cell) {
                        self.recompute_bounds();
                    }
                }
                removed
            }
            None => false,
        };
        debug_assert!(removed, "entity {id:?} missing from its cell {cell:?}");
    }

    fn on_boundary(&self, cell: CellCoord) -> bool {
        self.bounds
            .is_some_and(|(lo, hi)| cell.x == lo.x || cell.x == hi.x || cell.y == lo.y || cell.y == hi.y)
    }

    fn recompute_bounds(&mut self) {
        self.bounds = self.cells.keys().fold(None, |acc, c| {
            Some(match acc {
                None => (*c, *c),
                Some((lo, hi)) => (
                    CellCoord::new(lo.x.min(c.x), lo.y.min(c.y)),
                    CellCoord::new(hi.x.max(c.x), hi.y.max(c.y)),
                ),
            })
        });
    }

    /// Visit every entity in ring `k` around `c`, clipped to `bounds`.
    /// Returns the number of cells the clipped ring covers.
    fn for_each_in_ring(
        &self,
        (cx, cy): (i64, i64),
        k: i64,
        (lo, hi): (CellCoord, CellCoord),
        mut f: impl FnMut(EntityId, Vec2),
    ) -> usize {
        let (lo_x, lo_y) = (i64::from(lo.x), i64::from(lo.y));
        let (hi_x, hi_y) = (i64::from(hi.x), i64::from(hi.y));
        let mut cells = 0;
        let mut visit = |x: i64, y: i64| {
            cells += 1;
            // Clipped coordinates lie inside the bounds, which are i32.
            let coord = CellCoord::new(x as i32, y as i32);
            if let Some(bucket) = self.cells.get(&coord) {
                for id in bucket {
                    f(*id, self.placements[id].pos);
                }
            }
        };

        let (x0, x1) = ((cx - k).max(lo_x), (cx + k).min(hi_x));
        let row_count = if k == 0 { 1 } else { 2 };
        for y in [cy - k, cy + k].into_iter().take(row_count) {
            if (lo_y..=hi_y).contains(&y) {
                for x in x0..=x1 {
                    visit(x, y);
                }
            }
        }
        if k == 0 {
            return cells;
        }
        let (y0, y1) = ((cy - k + 1).max(lo_y), (cy + k - 1).min(hi_y));
        for x in [cx - k, cx + k] {
            if (lo_x..=hi_x).contains(&x) {
                for y in y0..=y1 {
                    visit(x, y);
                }
            }
        }
        cells
    }
}

fn keep_closer(best: &mut Option<(f32, EntityId)>, id: EntityId, d2: f32) {
    let better = match *best {
        None => true,
        Some((bd, bid)) => d2 < bd || (d2 == bd && id < bid),
    };
    if better {
        *best = Some((d2, id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn id(n: u128) -> EntityId {
        EntityId::from_raw(n)
    }

    fn random_grid(rng: &mut ChaCha8Rng, count: usize, extent: f32) -> (SpatialGrid, Vec<(EntityId, Vec2)>) {
        let mut grid = SpatialGrid::new(5.0);
        let mut entities = Vec::new();
        for i in 0..count {
            let pos = Vec2::new(rng.gen_range(-extent..extent), rng.gen_range(-extent..extent));
            grid.insert(id(i as u128), pos);
            entities.push((id(i as u128), pos));
        }
        (grid, entities)
    }

    fn brute_force(entities: &[(EntityId, Vec2)], center: Vec2, radius: f32) -> HashSet<EntityId> {
        entities
            .iter()
            .filter(|(_, p)| p.distance_squared(center) <= radius * radius)
            .map(|(id, _)| *id)
            .collect()
    }

    #[test]
    fn position_to_cell_basic() {
        let grid = SpatialGrid::new(16.0);
        assert_eq!(grid.position_to_cell(Vec2::new(10.0, 10.0)), CellCoord::new(0, 0));
        assert_eq!(grid.position_to_cell(Vec2::new(20.0, -5.0)), CellCoord::new(1, -1));
    }

    #[test]
    #[should_panic(expected = "cell_size must be positive")]
    fn zero_cell_size_panics() {
        SpatialGrid::new(0.0);
    }

    #[test]
    fn insert_files_entity_in_one_cell() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(1.0, 1.0));
        grid.insert(id(2), Vec2::new(7.0, 1.0));
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.cell_count(), 2);
        assert_eq!(grid.total_placements(), 2);
        assert!(grid.entities_in_cell(CellCoord::new(0, 0)).contains(&id(1)));
        assert!(grid.check_invariants().is_ok());
    }

    #[test]
    fn move_across_cells_keeps_single_placement() {
        let mut grid = SpatialGrid::new(5.0);
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(12.0, -3.0);
        grid.insert(id(1), a);
        grid.move_entity(id(1), a, b);

        assert!(grid.entities_in_cell(CellCoord::new(0, 0)).is_empty());
        assert!(grid.entities_in_cell(CellCoord::new(2, -1)).contains(&id(1)));
        assert_eq!(grid.total_placements(), 1);
        assert_eq!(grid.cell_count(), 1);
        assert_eq!(grid.position(id(1)), Some(b));
        assert!(grid.check_invariants().is_ok());
    }

    #[test]
    fn move_within_cell_updates_position_only() {
        let mut grid = SpatialGrid::new(5.0);
        let a = Vec2::new(1.0, 1.0);
        let b = Vec2::new(4.0, 2.0);
        grid.insert(id(1), a);
        grid.move_entity(id(1), a, b);
        assert_eq!(grid.position(id(1)), Some(b));
        assert_eq!(grid.total_placements(), 1);
        // The updated position is what range queries filter on.
        assert!(grid.query_radius(Vec2::new(4.0, 2.0), 0.1).contains(&id(1)));
        assert!(grid.query_radius(a, 0.1).is_empty());
    }

    #[test]
    fn stale_old_position_uses_tracked_cell() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(1.0, 1.0));
        grid.move_entity(id(1), Vec2::new(100.0, 100.0), Vec2::new(11.0, 1.0));
        assert_eq!(grid.total_placements(), 1);
        assert!(grid.check_invariants().is_ok());
    }

    #[test]
    fn insert_twice_relocates() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(1.0, 1.0));
        grid.insert(id(1), Vec2::new(21.0, 1.0));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.total_placements(), 1);
        assert!(grid.check_invariants().is_ok());
    }

    #[test]
    fn move_untracked_inserts() {
        let mut grid = SpatialGrid::new(5.0);
        grid.move_entity(id(9), Vec2::ZERO, Vec2::new(3.0, 3.0));
        assert!(grid.contains(id(9)));
        assert!(grid.check_invariants().is_ok());
    }

    #[test]
    fn remove_clears_cell() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(1.0, 1.0));
        assert_eq!(grid.remove(id(1)), Some(Vec2::new(1.0, 1.0)));
        assert_eq!(grid.remove(id(1)), None);
        assert!(grid.is_empty());
        assert_eq!(grid.cell_count(), 0);
        assert!(grid.nearest(Vec2::ZERO).is_none());
    }

    #[test]
    fn query_radius_is_exact_not_cellwise() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(0.5, 0.5));
        grid.insert(id(2), Vec2::new(4.5, 4.5));
        let hits = grid.query_radius(Vec2::new(0.0, 0.0), 1.0);
        assert_eq!(hits, vec![id(1)]);
    }

    #[test]
    fn query_radius_handles_degenerate_radii() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(2.0, 2.0));
        assert_eq!(grid.query_radius(Vec2::new(2.0, 2.0), 0.0), vec![id(1)]);
        assert!(grid.query_radius(Vec2::new(2.0, 2.0), -1.0).is_empty());
        assert!(grid.query_radius(Vec2::new(2.0, 2.0), f32::NAN).is_empty());
        assert_eq!(grid.query_radius(Vec2::ZERO, f32::INFINITY), vec![id(1)]);
    }

    #[test]
    fn query_radius_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(0xdead_beef);
        let (grid, entities) = random_grid(&mut rng, 400, 60.0);
        for _ in 0..200 {
            let center = Vec2::new(rng.gen_range(-70.0..70.0), rng.gen_range(-70.0..70.0));
            let radius = rng.gen_range(0.0..25.0);
            let got: HashSet<EntityId> = grid.query_radius(center, radius).into_iter().collect();
            assert_eq!(got, brute_force(&entities, center, radius));
        }
    }

    #[test]
    fn query_radius_matches_brute_force_after_moves() {
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let (mut grid, mut entities) = random_grid(&mut rng, 200, 30.0);
        for (eid, pos) in entities.iter_mut() {
            let next = *pos + Vec2::new(rng.gen_range(-8.0..8.0), rng.gen_range(-8.0..8.0));
            grid.move_entity(*eid, *pos, next);
            *pos = next;
        }
        assert!(grid.check_invariants().is_ok());
        for _ in 0..100 {
            let center = Vec2::new(rng.gen_range(-40.0..40.0), rng.gen_range(-40.0..40.0));
            let radius = rng.gen_range(0.0..15.0);
            let got: HashSet<EntityId> = grid.query_radius(center, radius).into_iter().collect();
            assert_eq!(got, brute_force(&entities, center, radius));
        }
    }

    #[test]
    fn nearest_matches_brute_force() {
        let mut rng = ChaCha8Rng::seed_from_u64(1234);
        let (grid, entities) = random_grid(&mut rng, 150, 50.0);
        for _ in 0..200 {
            let center = Vec2::new(rng.gen_range(-120.0..120.0), rng.gen_range(-120.0..120.0));
            let got = grid.nearest(center).unwrap();
            let best = entities
                .iter()
                .map(|(_, p)| p.distance_squared(center))
                .fold(f32::INFINITY, f32::min);
            let got_d = grid.position(got).unwrap().distance_squared(center);
            assert!((got_d - best).abs() <= 1e-3, "got {got_d}, best {best}");
        }
    }

    #[test]
    fn nearest_where_respects_predicate() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(1.0, 0.0));
        grid.insert(id(2), Vec2::new(30.0, 0.0));
        assert_eq!(grid.nearest(Vec2::ZERO), Some(id(1)));
        assert_eq!(grid.nearest_where(Vec2::ZERO, |e| e != id(1)), Some(id(2)));
        assert_eq!(grid.nearest_where(Vec2::ZERO, |_| false), None);
    }

    #[test]
    fn nearest_prefers_closer_entity_in_outer_ring() {
        // The centre cell holds a far corner entity; a neighbouring cell holds
        // a closer one. Stopping at the first non-empty ring would be wrong.
        let mut grid = SpatialGrid::new(10.0);
        let center = Vec2::new(9.5, 5.0);
        grid.insert(id(1), Vec2::new(0.1, 0.1));
        grid.insert(id(2), Vec2::new(10.5, 5.0));
        assert_eq!(grid.nearest(center), Some(id(2)));
    }

    #[test]
    fn get_nearby_covers_three_by_three() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(-4.0, -4.0));
        grid.insert(id(2), Vec2::new(9.0, 9.0));
        grid.insert(id(3), Vec2::new(11.0, 0.0));
        let nearby: HashSet<EntityId> = grid.get_nearby(Vec2::new(2.0, 2.0)).into_iter().collect();
        assert!(nearby.contains(&id(1)));
        assert!(nearby.contains(&id(2)));
        assert!(!nearby.contains(&id(3)));
    }

    #[test]
    fn nearest_from_far_away_centre() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(1.0, 1.0));
        grid.insert(id(2), Vec2::new(-40.0, 12.0));
        assert_eq!(grid.nearest(Vec2::new(1.0e7, 3.0)), Some(id(1)));
        assert_eq!(grid.nearest(Vec2::new(-1.0e7, 12.0)), Some(id(2)));
        assert!(grid.query_radius(Vec2::new(1.0e7, 0.0), 10.0).is_empty());
    }

    #[test]
    fn nearest_on_a_sparse_grid_falls_back_to_scanning() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(id(1), Vec2::ZERO);
        grid.insert(id(2), Vec2::new(4000.0, 4000.0));
        assert_eq!(grid.nearest(Vec2::new(2000.0, 2100.0)), Some(id(2)));
        assert_eq!(grid.nearest(Vec2::new(1900.0, 2000.0)), Some(id(1)));
        assert_eq!(grid.nearest_where(Vec2::new(3999.0, 3999.0), |e| e != id(2)), Some(id(1)));
    }

    #[test]
    fn bounds_shrink_when_an_edge_cell_empties() {
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(id(1), Vec2::new(0.5, 0.5));
        grid.insert(id(2), Vec2::new(4000.5, 10.5));
        assert_eq!(grid.bounds(), Some((CellCoord::new(0, 0), CellCoord::new(4000, 10))));

        grid.move_entity(id(2), Vec2::new(4000.5, 10.5), Vec2::new(2.5, 3.5));
        assert_eq!(grid.bounds(), Some((CellCoord::new(0, 0), CellCoord::new(2, 3))));

        grid.remove(id(2));
        assert_eq!(grid.bounds(), Some((CellCoord::new(0, 0), CellCoord::new(0, 0))));
        grid.remove(id(1));
        assert_eq!(grid.bounds(), None);
    }

    #[test]
    fn check_entity_reports_misfiled_placement() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(1.0, 1.0));
        assert!(grid.check_entity(id(1)).is_ok());
        assert!(grid.check_entity(id(2)).is_ok());

        if let Some(p) = grid.placements.get_mut(&id(1)) {
            p.pos = Vec2::new(12.0, 1.0);
        }
        assert!(matches!(
            grid.check_entity(id(1)),
            Err(SpatialError::Misfiled { actual, .. }) if actual == CellCoord::new(0, 0)
        ));
    }

    #[test]
    fn negative_coordinates_bucket_downward() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(-0.1, -0.1));
        assert!(grid.entities_in_cell(CellCoord::new(-1, -1)).contains(&id(1)));
        assert_eq!(grid.query_radius(Vec2::ZERO, 0.2), vec![id(1)]);
    }

    #[test]
    fn check_invariants_reports_duplicates() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::new(1.0, 1.0));
        grid.cells.entry(CellCoord::new(3, 3)).or_default().insert(id(1));
        assert!(matches!(
            grid.check_invariants(),
            Err(SpatialError::DuplicatePlacement { count: 2, .. })
        ));
    }

    #[test]
    fn rebuild_replaces_contents() {
        let mut grid = SpatialGrid::new(5.0);
        grid.insert(id(1), Vec2::ZERO);
        grid.rebuild([(id(2), Vec2::new(3.0, 3.0)), (id(3), Vec2::new(30.0, 3.0))]);
        assert!(!grid.contains(id(1)));
        assert_eq!(grid.len(), 2);
        assert!(grid.check_invariants().is_ok());
    }
}
