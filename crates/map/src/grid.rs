use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::cell::{Cell, CellKind, DEFAULT_DOOR_MATERIAL, DEFAULT_SOLID_MATERIAL};

/// Errors from building or mutating a [`Map`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("map has zero area ({width}x{height})")]
    Empty { width: usize, height: usize },
    #[error("expected {expected} cells for the map dimensions, got {actual}")]
    CellCountMismatch { expected: usize, actual: usize },
    #[error("cell ({x}, {y}) is outside the {width}x{height} map")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },
}

/// A record of every mutation applied to a loaded map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapEvent {
    DoorOpened { x: i32, y: i32 },
    DoorClosed { x: i32, y: i32 },
}

/// The level tile grid.
///
/// Row-major, `cells[y * width + x]`. Built once per level; only doors
/// change afterwards, through [`Map::open_door`] and [`Map::close_door`].
#[derive(Debug, Clone)]
pub struct Map {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    /// Cells that were doors at load time; only these may be re-closed.
    doors: BTreeSet<(i32, i32)>,
    event_log: Vec<MapEvent>,
}

impl Map {
    /// Build a map from row-major cells.
    ///
    /// Non-wall border cells are coerced to walls of the default material.
    pub fn new(width: usize, height: usize, mut cells: Vec<Cell>) -> Result<Self, MapError> {
        if width == 0 || height == 0 {
            return Err(MapError::Empty { width, height });
        }
        let expected = width * height;
        if cells.len() != expected {
            return Err(MapError::CellCountMismatch {
                expected,
                actual: cells.len(),
            });
        }

        let mut coerced = 0usize;
        for y in 0..height {
            for x in 0..width {
                let on_border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
                let cell = &mut cells[y * width + x];
                if on_border && cell.kind != CellKind::Wall {
                    let material_id = if cell.material_id == 0 {
                        DEFAULT_SOLID_MATERIAL
                    } else {
                        cell.material_id
                    };
                    *cell = Cell::wall(material_id).with_theme(cell.theme);
                    coerced += 1;
                }
            }
        }
        if coerced > 0 {
            tracing::warn!(coerced, width, height, "coerced open border cells to walls");
        }

        let doors = cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.kind == CellKind::Door)
            .map(|(i, _)| ((i % width) as i32, (i / width) as i32))
            .collect();

        Ok(Self {
            width,
            height,
            cells,
            doors,
            event_log: Vec::new(),
        })
    }

    /// A map with solid walls on the border and an empty interior.
    pub fn bordered(width: usize, height: usize) -> Result<Self, MapError> {
        MapBuilder::new(width, height).build()
    }

    /// Build from the integer grid encoding: `0` is empty, anything else is a
    /// wall of that material.
    pub fn from_material_grid(rows: &[Vec<u16>]) -> Result<Self, MapError> {
        let height = rows.len();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut cells = Vec::with_capacity(width * height);
        for row in rows {
            for x in 0..width {
                cells.push(match row.get(x) {
                    Some(0) => Cell::EMPTY,
                    Some(&m) => Cell::wall(m),
                    None => Cell::wall(DEFAULT_SOLID_MATERIAL),
                });
            }
        }
        Self::new(width, height, cells)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// The cell at grid coordinates, or `None` outside the grid.
    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        if self.contains(x, y) {
            Some(self.cells[y as usize * self.width + x as usize])
        } else {
            None
        }
    }

    /// Whether the cell blocks rays. Outside the grid counts as solid.
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.cell(x, y).is_none_or(|c| c.is_solid())
    }

    /// Row-major view of every cell.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Grid coordinates of every cell that was a door at load time.
    pub fn doors(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.doors.iter().copied()
    }

    /// Open the door at `(x, y)`. Returns `Ok(false)` if there is no closed
    /// door there.
    pub fn open_door(&mut self, x: i32, y: i32) -> Result<bool, MapError> {
        let idx = self.index(x, y)?;
        if self.cells[idx].kind != CellKind::Door {
            return Ok(false);
        }
        self.cells[idx].kind = CellKind::Empty;
        self.event_log.push(MapEvent::DoorOpened { x, y });
        tracing::debug!(x, y, "door opened");
        Ok(true)
    }

    /// Close a previously opened door. Cells that were never doors are left
    /// alone and report `Ok(false)`.
    pub fn close_door(&mut self, x: i32, y: i32) -> Result<bool, MapError> {
        let idx = self.index(x, y)?;
        if !self.doors.contains(&(x, y)) || self.cells[idx].kind != CellKind::Empty {
            return Ok(false);
        }
        self.cells[idx].kind = CellKind::Door;
        self.event_log.push(MapEvent::DoorClosed { x, y });
        tracing::debug!(x, y, "door closed");
        Ok(true)
    }

    /// Read-only access to the mutation log.
    pub fn events(&self) -> &[MapEvent] {
        &self.event_log
    }

    /// Drain and return the mutation log.
    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        std::mem::take(&mut self.event_log)
    }

    fn index(&self, x: i32, y: i32) -> Result<usize, MapError> {
        if self.contains(x, y) {
            Ok(y as usize * self.width + x as usize)
        } else {
            Err(MapError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }
}

/// Incremental construction of a bordered map, mostly for tests and tools.
#[derive(Debug, Clone)]
pub struct MapBuilder {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl MapBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        let mut cells = vec![Cell::EMPTY; width * height];
        for y in 0..height {
            for x in 0..width {
                if x == 0 || y == 0 || x + 1 == width || y + 1 == height {
                    cells[y * width + x] = Cell::wall(DEFAULT_SOLID_MATERIAL);
                }
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Set a cell. Coordinates outside the grid are ignored.
    pub fn cell(mut self, x: usize, y: usize, cell: Cell) -> Self {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
        self
    }

    pub fn wall(self, x: usize, y: usize, material_id: u16) -> Self {
        self.cell(x, y, Cell::wall(material_id))
    }

    pub fn door(self, x: usize, y: usize) -> Self {
        self.cell(x, y, Cell::door(DEFAULT_DOOR_MATERIAL))
    }

    /// Assign a theme index to every cell.
    pub fn theme(mut self, theme: u8) -> Self {
        for c in &mut self.cells {
            c.theme = theme;
        }
        self
    }

    pub fn build(self) -> Result<Map, MapError> {
        Map::new(self.width, self.height, self.cells)
    }
}
