use serde::{Deserialize, Serialize};

/// Material used for coerced border cells and malformed input.
pub const DEFAULT_SOLID_MATERIAL: u16 = 1;

/// Material given to doors parsed without an explicit one.
pub const DEFAULT_DOOR_MATERIAL: u16 = 9;

/// What occupies a map cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Empty,
    Wall,
    /// A closed door. Blocks rays until opened.
    Door,
}

/// One tile of the level grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub material_id: u16,
    pub kind: CellKind,
    /// Level theme index for the area this cell belongs to.
    pub theme: u8,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        material_id: 0,
        kind: CellKind::Empty,
        theme: 0,
    };

    pub fn wall(material_id: u16) -> Self {
        Self {
            material_id,
            kind: CellKind::Wall,
            theme: 0,
        }
    }

    pub fn door(material_id: u16) -> Self {
        Self {
            material_id,
            kind: CellKind::Door,
            theme: 0,
        }
    }

    pub fn with_theme(self, theme: u8) -> Self {
        Self { theme, ..self }
    }

    /// Whether the cell stops a ray.
    pub fn is_solid(&self) -> bool {
        !matches!(self.kind, CellKind::Empty)
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solidity_by_kind() {
        assert!(!Cell::EMPTY.is_solid());
        assert!(Cell::wall(3).is_solid());
        assert!(Cell::door(DEFAULT_DOOR_MATERIAL).is_solid());
    }

    #[test]
    fn with_theme_keeps_material() {
        let c = Cell::wall(4).with_theme(2);
        assert_eq!(c.material_id, 4);
        assert_eq!(c.theme, 2);
        assert_eq!(c.kind, CellKind::Wall);
    }
}
