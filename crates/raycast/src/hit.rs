use duskcast_common::Side;

/// What one ray found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// Perpendicular distance in world units, used for projection.
    pub distance: f32,
    /// Euclidean length of the ray in world units.
    pub raw_distance: f32,
    pub material_id: u16,
    pub side: Side,
    /// Horizontal texture coordinate along the face, in `[0, 1)`.
    pub wall_u: f32,
    pub map_x: i32,
    pub map_y: i32,
    /// False when the ray reached `max_depth` or left the grid.
    pub hit: bool,
}

impl Default for HitResult {
    fn default() -> Self {
        Self {
            distance: 0.0,
            raw_distance: 0.0,
            material_id: 0,
            side: Side::Vertical,
            wall_u: 0.0,
            map_x: 0,
            map_y: 0,
            hit: false,
        }
    }
}

/// Per-column hit results for the current frame.
///
/// Owned by the caster and refilled every frame; it only grows.
#[derive(Debug, Clone, Default)]
pub struct DistanceBuffer {
    entries: Vec<HitResult>,
}

impl DistanceBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize to `columns` entries, keeping the allocation.
    pub(crate) fn prepare(&mut self, columns: usize) -> &mut [HitResult] {
        self.entries.clear();
        self.entries.resize(columns, HitResult::default());
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&HitResult> {
        self.entries.get(column)
    }

    pub fn as_slice(&self) -> &[HitResult] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &HitResult> {
        self.entries.iter()
    }

    /// Perpendicular wall distance per column.
    pub fn distances(&self) -> impl Iterator<Item = f32> + '_ {
        self.entries.iter().map(|h| h.distance)
    }

    /// Wall distance at `column`, or infinity outside the buffer.
    pub fn depth_at(&self, column: usize) -> f32 {
        self.entries.get(column).map_or(f32::INFINITY, |h| h.distance)
    }
}
