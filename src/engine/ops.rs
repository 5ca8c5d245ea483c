use log::trace;
use rand::Rng;

use super::state::{Grid, MoveDirection, Score, Tile};

/// Result of sliding every line of a grid in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shifted {
    /// The grid after sliding/merging (no random insert).
    pub grid: Grid,
    /// Sum of the merged values produced by this slide.
    pub score: Score,
    /// Number of merges performed across all lines.
    pub merges: usize,
    /// True if at least one cell differs from the input grid.
    pub changed: bool,
}

/// `(number of lines, line length)` for a direction.
///
/// NORTH/SOUTH process columns, EAST/WEST process rows.
#[inline]
pub(crate) fn line_geometry(grid: &Grid, dir: MoveDirection) -> (usize, usize) {
    if dir.is_vertical() {
        (grid.width(), grid.height())
    } else {
        (grid.height(), grid.width())
    }
}

/// Flat index of the `k`-th cell of `line`, counting from the edge tiles travel toward.
#[inline]
pub(crate) fn line_cell(grid: &Grid, dir: MoveDirection, line: usize, k: usize) -> usize {
    let (w, h) = (grid.width(), grid.height());
    let (x, y) = match dir {
        MoveDirection::North => (line, k),
        MoveDirection::South => (line, h - 1 - k),
        MoveDirection::West => (k, line),
        MoveDirection::East => (w - 1 - k, line),
    };
    y * w + x
}

#[inline]
fn line_values(grid: &Grid, dir: MoveDirection, line: usize) -> impl Iterator<Item = Tile> + '_ {
    let (_, len) = line_geometry(grid, dir);
    (0..len).map(move |k| grid.cell(line_cell(grid, dir, line, k)))
}

#[inline]
fn can_merge(a: Tile, b: Tile) -> bool {
    a != 0 && a == b && a.checked_add(b).is_some()
}

/// True for `0` and for powers of two.
#[inline]
pub fn is_valid_tile(value: Tile) -> bool {
    value == 0 || value.is_power_of_two()
}

/// Slide/merge one line toward index 0.
///
/// `line` is in travel order (closest to the destination edge first). Each
/// tile takes part in at most one merge, so `[2, 2, 2]` becomes `[4, 2, 0]`.
/// Returns the new line (same length) and the score the merges earned.
///
/// ```
/// use ttfe::engine::slide_line;
/// assert_eq!(slide_line(&[8, 2, 2, 2]), (vec![8, 4, 2, 0], 4));
/// assert_eq!(slide_line(&[2, 2, 4, 4]), (vec![4, 8, 0, 0], 12));
/// ```
pub fn slide_line(line: &[Tile]) -> (Vec<Tile>, Score) {
    let mut out: Vec<Tile> = Vec::with_capacity(line.len());
    let mut score: Score = 0;
    // Whether `out.last()` was produced by a merge in this pass.
    let mut last_merged = false;
    for &val in line.iter().filter(|&&v| v != 0) {
        match out.last_mut() {
            Some(last) if !last_merged && can_merge(*last, val) => {
                *last += val;
                score += Score::from(*last);
                last_merged = true;
            }
            _ => {
                out.push(val);
                last_merged = false;
            }
        }
    }
    out.resize(line.len(), 0);
    (out, score)
}

/// Whether sliding a line (given in travel order) would change it.
///
/// A line moves if a tile sits behind a gap or two neighbouring tiles can merge.
pub fn line_can_move<I: IntoIterator<Item = Tile>>(line: I) -> bool {
    let mut seen_gap = false;
    let mut prev: Tile = 0;
    for val in line {
        if val == 0 {
            seen_gap = true;
            continue;
        }
        if seen_gap || can_merge(prev, val) {
            return true;
        }
        prev = val;
    }
    false
}

/// Slide/merge every line of `grid` in `dir`. No randomness.
///
/// ```
/// use ttfe::engine::{shift, Grid, MoveDirection};
/// let g = Grid::from_rows(&[[2, 2, 2, 8]]).unwrap();
/// let s = shift(&g, MoveDirection::East);
/// assert_eq!(s.grid.rows(), vec![vec![0, 2, 4, 8]]);
/// assert_eq!(s.score, 4);
/// assert!(s.changed);
/// ```
pub fn shift(grid: &Grid, dir: MoveDirection) -> Shifted {
    let (lines, len) = line_geometry(grid, dir);
    let mut out = grid.clone();
    let mut score: Score = 0;
    let mut merges = 0;
    let mut changed = false;
    let mut buf: Vec<Tile> = Vec::with_capacity(len);

    for line in 0..lines {
        buf.clear();
        buf.extend(line_values(grid, dir, line));
        let before = buf.iter().filter(|&&v| v != 0).count();
        let (slid, line_score) = slide_line(&buf);
        let after = slid.iter().filter(|&&v| v != 0).count();

        for (k, &val) in slid.iter().enumerate() {
            let idx = line_cell(grid, dir, line, k);
            if out.cell(idx) != val {
                out.set_cell(idx, val);
                changed = true;
            }
        }
        if line_score > 0 {
            trace!("{dir} line {line}: {buf:?} -> {slid:?} (+{line_score})");
        }
        score += line_score;
        merges += before - after;
    }

    Shifted { grid: out, score, merges, changed }
}

/// True if sliding `grid` in `dir` would change at least one cell.
pub fn is_move_possible(grid: &Grid, dir: MoveDirection) -> bool {
    let (lines, _) = line_geometry(grid, dir);
    (0..lines).any(|line| line_can_move(line_values(grid, dir, line)))
}

/// True if no move in any direction changes the board.
pub fn is_game_over(grid: &Grid) -> bool {
    !MoveDirection::ALL.iter().any(|&dir| is_move_possible(grid, dir))
}

/// Uniformly pick one empty cell, or `None` when the grid is full.
pub(crate) fn random_empty_cell<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Option<usize> {
    let empty = grid.empty_cells();
    if empty.is_empty() {
        return None;
    }
    Some(empty[rng.gen_range(0..empty.len())])
}

/// Draw a spawn value: `2` with probability `two_probability`, otherwise `4`.
pub(crate) fn generate_random_tile<R: Rng + ?Sized>(rng: &mut R, two_probability: f64) -> Tile {
    if rng.gen_bool(two_probability) {
        2
    } else {
        4
    }
}
