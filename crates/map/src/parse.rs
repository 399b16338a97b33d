use crate::cell::{Cell, DEFAULT_DOOR_MATERIAL, DEFAULT_SOLID_MATERIAL};
use crate::grid::{Map, MapError};

impl Map {
    /// Parse a text level.
    ///
    /// `.` and space are empty, `1`-`9` walls of that material, `#` a wall of
    /// the default material and `D` a closed door. Unknown characters become
    /// default walls. Short rows are padded with walls; blank lines at the
    /// start and end are ignored.
    pub fn parse_ascii(text: &str) -> Result<Self, MapError> {
        let lines: Vec<&str> = text
            .lines()
            .map(|l| l.trim_end_matches('\r'))
            .skip_while(|l| l.trim().is_empty())
            .collect();
        let end = lines
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |i| i + 1);
        let lines = &lines[..end];

        let height = lines.len();
        let width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

        let mut unknown = 0usize;
        let mut cells = Vec::with_capacity(width * height);
        for line in lines {
            let mut row_len = 0;
            for ch in line.chars() {
                cells.push(match ch {
                    '.' | ' ' => Cell::EMPTY,
                    '#' => Cell::wall(DEFAULT_SOLID_MATERIAL),
                    'D' => Cell::door(DEFAULT_DOOR_MATERIAL),
                    '1'..='9' => Cell::wall(ch as u16 - '0' as u16),
                    _ => {
                        unknown += 1;
                        Cell::wall(DEFAULT_SOLID_MATERIAL)
                    }
                });
                row_len += 1;
            }
            for _ in row_len..width {
                cells.push(Cell::wall(DEFAULT_SOLID_MATERIAL));
            }
        }
        if unknown > 0 {
            tracing::warn!(unknown, "unknown map characters resolved to solid walls");
        }

        Map::new(width, height, cells)
    }
}
