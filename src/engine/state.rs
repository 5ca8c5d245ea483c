use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::simulator::SimulatorError;

/// A tile value: `0` for an empty cell, otherwise a power of two.
pub type Tile = u32;
/// Accumulated merge score.
pub type Score = u64;

/// A direction to slide/merge tiles.
///
/// NORTH moves tiles toward row `y = 0`, SOUTH toward the last row,
/// WEST toward column `x = 0` and EAST toward the last column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    North,
    South,
    East,
    West,
}

impl MoveDirection {
    /// Every direction, in stable declaration order.
    pub const ALL: [MoveDirection; 4] = [
        MoveDirection::North,
        MoveDirection::South,
        MoveDirection::East,
        MoveDirection::West,
    ];

    #[inline]
    pub fn all() -> [MoveDirection; 4] {
        Self::ALL
    }

    /// True for NORTH/SOUTH, whose lines are columns.
    #[inline]
    pub fn is_vertical(self) -> bool {
        matches!(self, MoveDirection::North | MoveDirection::South)
    }

    /// Single-letter shorthand used by move scripts (`N`, `S`, `E`, `W`).
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(MoveDirection::North),
            'S' => Some(MoveDirection::South),
            'E' => Some(MoveDirection::East),
            'W' => Some(MoveDirection::West),
            _ => None,
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoveDirection::North => "NORTH",
            MoveDirection::South => "SOUTH",
            MoveDirection::East => "EAST",
            MoveDirection::West => "WEST",
        };
        f.write_str(name)
    }
}

impl FromStr for MoveDirection {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(dir) = MoveDirection::from_char(c) {
                return Ok(dir);
            }
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "north" | "up" => Ok(MoveDirection::North),
            "south" | "down" => Ok(MoveDirection::South),
            "east" | "right" => Ok(MoveDirection::East),
            "west" | "left" => Ok(MoveDirection::West),
            _ => Err(SimulatorError::UnknownDirection(s.to_string())),
        }
    }
}

/// A `width x height` board of tiles, stored row-major (`y * width + x`).
///
/// `x` is the column and `y` the row. The grid itself enforces no game rules;
/// [`crate::Simulator`] owns the invariants.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Tile>,
}

impl Grid {
    /// An empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Grid { width, height, cells: vec![0; width * height] }
    }

    /// Build a grid from row vectors (`rows[y][x]`).
    ///
    /// Returns `None` when there are no rows or the rows have unequal length.
    ///
    /// ```
    /// use ttfe::engine::Grid;
    /// let g = Grid::from_rows(&[vec![2, 0], vec![0, 4]]).unwrap();
    /// assert_eq!(g.get(1, 1), Some(4));
    /// assert!(Grid::from_rows(&[vec![2, 0], vec![4]]).is_none());
    /// ```
    pub fn from_rows<T: AsRef<[Tile]>>(rows: &[T]) -> Option<Self> {
        let width = rows.first()?.as_ref().len();
        if width == 0 || rows.iter().any(|r| r.as_ref().len() != width) {
            return None;
        }
        let cells = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Some(Grid { width, height: rows.len(), cells })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Total number of cells.
    #[inline]
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    /// Flat index for `(x, y)`, or `None` when outside the grid.
    #[inline]
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y * self.width + x)
        } else {
            None
        }
    }

    /// `(x, y)` for a flat index.
    #[inline]
    pub fn position(&self, idx: usize) -> (usize, usize) {
        debug_assert!(idx < self.cells.len());
        (idx % self.width, idx / self.width)
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Tile> {
        self.index(x, y).map(|idx| self.cells[idx])
    }

    /// Overwrite `(x, y)`, returning the previous value, or `None` when outside the grid.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: Tile) -> Option<Tile> {
        let idx = self.index(x, y)?;
        Some(std::mem::replace(&mut self.cells[idx], value))
    }

    #[inline]
    pub(crate) fn cell(&self, idx: usize) -> Tile {
        self.cells[idx]
    }

    #[inline]
    pub(crate) fn set_cell(&mut self, idx: usize, value: Tile) {
        self.cells[idx] = value;
    }

    /// Raw cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Tile] {
        &self.cells
    }

    /// Number of occupied cells.
    pub fn count_pieces(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    /// Flat indices of every empty cell, in row-major order.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 0)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|&v| v != 0)
    }

    /// Largest tile on the board (0 when empty).
    pub fn highest_tile(&self) -> Tile {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// Copy of the grid as row vectors (`rows[y][x]`).
    pub fn rows(&self) -> Vec<Vec<Tile>> {
        self.cells.chunks(self.width.max(1)).map(<[Tile]>::to_vec).collect()
    }

    /// Clear every cell.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = 0);
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("rows", &self.rows())
            .finish()
    }
}

const CELL_WIDTH: usize = 7;

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(self.width * (CELL_WIDTH + 1));
        writeln!(f)?;
        for (y, row) in self.cells.chunks(self.width.max(1)).enumerate() {
            if y > 0 {
                writeln!(f, "{rule}")?;
            }
            let line: Vec<String> = row.iter().map(format_val).collect();
            writeln!(f, "{}", line.join("|"))?;
        }
        Ok(())
    }
}

fn format_val(val: &Tile) -> String {
    match val {
        0 => " ".repeat(CELL_WIDTH),
        &x => {
            let mut x = x.to_string();
            while x.len() < CELL_WIDTH {
                match x.len() {
                    6 => x = format!(" {}", x),
                    _ => x = format!(" {} ", x),
                }
            }
            x
        }
    }
}
