//! The board simulator: game state, spawn policy and move bookkeeping.
//!
//! [`Simulator`] owns a [`Grid`], an injected random source and the move and
//! score counters. Rule-free slide/merge mechanics live in [`crate::engine`];
//! this module decides when they are committed, scored and followed by a spawn.

use std::fmt;

use log::{debug, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::SimulatorConfig;
use crate::engine::{self, Grid, MoveDirection, Score, Tile};

/// Pieces spawned when a simulator is created.
pub const INITIAL_PIECES: usize = 2;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SimulatorError {
    #[error("position ({x}, {y}) is outside the {width}x{height} board")]
    OutOfRange { x: usize, y: usize, width: usize, height: usize },
    #[error("piece value {0} is neither 0 nor a power of two")]
    InvalidPiece(Tile),
    #[error("a {width}x{height} board cannot hold the starting pieces")]
    InvalidDimensions { width: usize, height: usize },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unknown move direction: {0:?}")]
    UnknownDirection(String),
    #[error("no empty cell left to place a piece")]
    BoardFull,
}

impl SimulatorError {
    /// The caller passed an argument the simulator cannot accept.
    pub fn is_invalid_argument(&self) -> bool {
        !self.is_illegal_state()
    }

    /// The operation is not allowed in the simulator's current state.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, SimulatorError::BoardFull)
    }
}

pub type Result<T> = std::result::Result<T, SimulatorError>;

/// A seedable 2048-style game.
///
/// Coordinates are `(x, y)`: `x` is the column in `[0, width)`, `y` the row
/// in `[0, height)`. The random source `R` drives every spawn and is the only
/// source of non-determinism.
///
/// ```
/// use ttfe::{MoveDirection, Simulator};
///
/// let mut sim = Simulator::from_seed(4, 4, 7).unwrap();
/// assert_eq!(sim.num_pieces(), 2);
///
/// let moved = MoveDirection::ALL.into_iter().any(|d| sim.perform_move(d));
/// assert!(moved);
/// assert_eq!(sim.num_moves(), 1);
/// ```
#[derive(Clone)]
pub struct Simulator<R = StdRng> {
    grid: Grid,
    num_pieces: usize,
    num_moves: u64,
    points: Score,
    rng: R,
    config: SimulatorConfig,
}

impl Simulator<StdRng> {
    /// Build a simulator driven by `StdRng::seed_from_u64(seed)`.
    pub fn from_seed(width: usize, height: usize, seed: u64) -> Result<Self> {
        Simulator::new(width, height, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Simulator<R> {
    /// Create a `width x height` game with the default spawn policy and two starting pieces.
    pub fn new(width: usize, height: usize, rng: R) -> Result<Self> {
        Self::with_config(SimulatorConfig::new(width, height), rng)
    }

    /// Create a game from an explicit config and two starting pieces.
    pub fn with_config(config: SimulatorConfig, rng: R) -> Result<Self> {
        config.validate()?;
        let mut sim = Simulator {
            grid: Grid::new(config.width, config.height),
            num_pieces: 0,
            num_moves: 0,
            points: 0,
            rng,
            config,
        };
        for _ in 0..INITIAL_PIECES {
            sim.add_piece()?;
        }
        debug!(
            "new {}x{} simulator, p(2) = {}",
            sim.config.width, sim.config.height, sim.config.spawn.two_probability
        );
        Ok(sim)
    }

    /// Spawn a `2` or `4` on a uniformly random empty cell.
    ///
    /// Fails with [`SimulatorError::BoardFull`] when there is no empty cell; the board is left as is.
    pub fn add_piece(&mut self) -> Result<()> {
        let idx = engine::random_empty_cell(&self.grid, &mut self.rng).ok_or(SimulatorError::BoardFull)?;
        let value = engine::generate_random_tile(&mut self.rng, self.config.spawn.two_probability);
        self.grid.set_cell(idx, value);
        self.num_pieces += 1;
        let (x, y) = self.grid.position(idx);
        debug!("spawned {value} at ({x}, {y})");
        Ok(())
    }

    /// Slide and merge every line toward `direction`.
    ///
    /// Returns `true` if the board changed, in which case the merge score is
    /// added, the move counter advances and a new piece is spawned. An
    /// unchanged board leaves grid, score and counters untouched.
    pub fn perform_move(&mut self, direction: MoveDirection) -> bool {
        let shifted = engine::shift(&self.grid, direction);
        if !shifted.changed {
            trace!("{direction} leaves the board unchanged");
            return false;
        }
        self.grid = shifted.grid;
        self.num_pieces -= shifted.merges;
        self.points += shifted.score;
        self.num_moves += 1;
        debug!(
            "move #{} {direction}: {} merge(s), +{} points (total {})",
            self.num_moves, shifted.merges, shifted.score, self.points
        );
        if self.is_space_left() {
            // Cannot fail: there is an empty cell.
            let _ = self.add_piece();
        }
        true
    }
}

impl<R> Simulator<R> {
    #[inline]
    pub fn board_width(&self) -> usize {
        self.grid.width()
    }

    #[inline]
    pub fn board_height(&self) -> usize {
        self.grid.height()
    }

    /// Value at `(x, y)`; `0` means empty.
    pub fn piece_at(&self, x: usize, y: usize) -> Result<Tile> {
        self.grid.get(x, y).ok_or_else(|| self.out_of_range(x, y))
    }

    /// Overwrite `(x, y)` directly, bypassing game rules.
    ///
    /// Meant for setting up arbitrary boards. The value must be `0` or a
    /// power of two; the piece count is kept in sync.
    pub fn set_piece_at(&mut self, x: usize, y: usize, value: Tile) -> Result<()> {
        let idx = self.grid.index(x, y).ok_or_else(|| self.out_of_range(x, y))?;
        if !engine::is_valid_tile(value) {
            return Err(SimulatorError::InvalidPiece(value));
        }
        let old = self.grid.cell(idx);
        self.grid.set_cell(idx, value);
        match (old != 0, value != 0) {
            (false, true) => self.num_pieces += 1,
            (true, false) => self.num_pieces -= 1,
            _ => {}
        }
        Ok(())
    }

    #[inline]
    pub fn num_pieces(&self) -> usize {
        self.num_pieces
    }

    #[inline]
    pub fn num_moves(&self) -> u64 {
        self.num_moves
    }

    #[inline]
    pub fn points(&self) -> Score {
        self.points
    }

    /// True while at least one cell is empty.
    #[inline]
    pub fn is_space_left(&self) -> bool {
        self.num_pieces < self.grid.area()
    }

    /// True if any direction would change the board.
    pub fn is_move_possible(&self) -> bool {
        !engine::is_game_over(&self.grid)
    }

    /// True if sliding in `direction` would change the board. Never mutates or draws randomness.
    pub fn is_move_possible_in(&self, direction: MoveDirection) -> bool {
        engine::is_move_possible(&self.grid, direction)
    }

    /// Largest tile on the board (0 when empty).
    pub fn highest_piece(&self) -> Tile {
        self.grid.highest_tile()
    }

    /// Board contents as row vectors (`rows[y][x]`).
    pub fn rows(&self) -> Vec<Vec<Tile>> {
        self.grid.rows()
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    fn out_of_range(&self, x: usize, y: usize) -> SimulatorError {
        SimulatorError::OutOfRange { x, y, width: self.grid.width(), height: self.grid.height() }
    }
}

/// Factory mirroring [`Simulator::from_seed`].
pub fn create_simulator(width: usize, height: usize, seed: u64) -> Result<Simulator<StdRng>> {
    Simulator::from_seed(width, height, seed)
}

impl<R> fmt::Display for Simulator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grid)?;
        writeln!(f, "moves: {} | points: {}", self.num_moves, self.points)
    }
}

impl<R> fmt::Debug for Simulator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("grid", &self.grid)
            .field("num_pieces", &self.num_pieces)
            .field("num_moves", &self.num_moves)
            .field("points", &self.points)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulator {
        Simulator::from_seed(4, 4, 0).unwrap()
    }

    fn load(sim: &mut Simulator, rows: &[[Tile; 4]; 4]) {
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                sim.set_piece_at(x, y, v).unwrap();
            }
        }
    }

    fn clear(sim: &mut Simulator) {
        load(sim, &[[0; 4]; 4]);
    }

    #[test]
    fn starts_with_two_small_pieces() {
        let s = sim();
        assert_eq!(s.num_pieces(), 2);
        assert_eq!(s.grid().count_pieces(), 2);
        assert_eq!((s.num_moves(), s.points()), (0, 0));
        assert!(s.grid().cells().iter().all(|&v| v == 0 || v == 2 || v == 4));
    }

    #[test]
    fn same_seed_same_game() {
        let mut a = Simulator::from_seed(4, 4, 99).unwrap();
        let mut b = Simulator::from_seed(4, 4, 99).unwrap();
        assert_eq!(a.rows(), b.rows());
        for dir in [MoveDirection::West, MoveDirection::North, MoveDirection::East, MoveDirection::South] {
            assert_eq!(a.perform_move(dir), b.perform_move(dir));
            assert_eq!(a.rows(), b.rows());
        }
    }

    #[test]
    fn out_of_range_access() {
        let mut s = sim();
        let err = s.piece_at(4, 0).unwrap_err();
        assert_eq!(err, SimulatorError::OutOfRange { x: 4, y: 0, width: 4, height: 4 });
        assert!(err.is_invalid_argument());
        assert!(s.piece_at(0, 4).is_err());
        assert!(s.set_piece_at(7, 7, 2).unwrap_err().is_invalid_argument());
        assert_eq!(s.num_pieces(), 2);
    }

    #[test]
    fn set_piece_tracks_count() {
        let mut s = sim();
        clear(&mut s);
        assert_eq!(s.num_pieces(), 0);
        s.set_piece_at(1, 1, 8).unwrap();
        s.set_piece_at(1, 1, 16).unwrap();
        assert_eq!(s.num_pieces(), 1);
        s.set_piece_at(2, 3, 2).unwrap();
        assert_eq!(s.num_pieces(), 2);
        s.set_piece_at(1, 1, 0).unwrap();
        assert_eq!(s.num_pieces(), 1);
        assert_eq!(s.piece_at(2, 3).unwrap(), 2);
    }

    #[test]
    fn rejects_non_power_of_two() {
        let mut s = sim();
        clear(&mut s);
        let err = s.set_piece_at(0, 0, 6).unwrap_err();
        assert_eq!(err, SimulatorError::InvalidPiece(6));
        assert!(err.is_invalid_argument());
        assert_eq!(s.piece_at(0, 0).unwrap(), 0);
        assert_eq!(s.num_pieces(), 0);
    }

    #[test]
    fn add_piece_on_full_board_fails() {
        let mut s = sim();
        load(&mut s, &[[8; 4]; 4]);
        let err = s.add_piece().unwrap_err();
        assert_eq!(err, SimulatorError::BoardFull);
        assert!(err.is_illegal_state());
        assert!(s.grid().cells().iter().all(|&v| v == 8));
        assert_eq!(s.num_pieces(), 16);
    }

    #[test]
    fn merge_scores_and_spawns() {
        let mut s = sim();
        clear(&mut s);
        s.set_piece_at(0, 0, 2).unwrap();
        s.set_piece_at(0, 2, 2).unwrap();
        assert!(s.perform_move(MoveDirection::North));
        assert_eq!(s.piece_at(0, 0).unwrap(), 4);
        assert_eq!(s.points(), 4);
        assert_eq!(s.num_moves(), 1);
        // One merged piece plus one spawn.
        assert_eq!(s.num_pieces(), 2);
        assert_eq!(s.grid().count_pieces(), 2);
    }

    #[test]
    fn slide_without_merge_keeps_points() {
        let mut s = sim();
        clear(&mut s);
        s.set_piece_at(3, 3, 2).unwrap();
        assert!(s.perform_move(MoveDirection::West));
        assert_eq!(s.piece_at(0, 3).unwrap(), 2);
        assert_eq!(s.points(), 0);
        assert_eq!(s.num_moves(), 1);
        assert_eq!(s.num_pieces(), 2);
    }

    #[test]
    fn blocked_move_changes_nothing() {
        let mut s = sim();
        load(&mut s, &[[2, 4, 8, 16], [32, 64, 128, 256], [512, 1024, 2, 4], [8, 16, 32, 64]]);
        let before = s.rows();
        for dir in MoveDirection::ALL {
            assert!(!s.is_move_possible_in(dir));
            assert!(!s.perform_move(dir));
        }
        assert!(!s.is_move_possible());
        assert!(!s.is_space_left());
        assert_eq!(s.rows(), before);
        assert_eq!((s.num_moves(), s.points()), (0, 0));
    }

    #[test]
    fn rectangular_boards() {
        let mut s = Simulator::from_seed(5, 2, 3).unwrap();
        assert_eq!((s.board_width(), s.board_height()), (5, 2));
        assert!(s.piece_at(4, 1).is_ok());
        assert!(s.piece_at(1, 4).is_err());
        for y in 0..2 {
            for x in 0..5 {
                s.set_piece_at(x, y, 0).unwrap();
            }
        }
        s.set_piece_at(0, 1, 4).unwrap();
        s.set_piece_at(4, 1, 4).unwrap();
        assert!(s.perform_move(MoveDirection::East));
        assert_eq!(s.piece_at(4, 1).unwrap(), 8);
        assert_eq!(s.points(), 8);
    }

    #[test]
    fn construction_validates() {
        assert!(matches!(
            Simulator::from_seed(1, 1, 0),
            Err(SimulatorError::InvalidDimensions { width: 1, height: 1 })
        ));
        let cfg = SimulatorConfig::default().with_two_probability(-0.1);
        assert!(matches!(
            Simulator::with_config(cfg, StdRng::seed_from_u64(0)),
            Err(SimulatorError::InvalidConfig(_))
        ));
        // The smallest legal board is filled by the starting pieces.
        let s = create_simulator(2, 1, 0).unwrap();
        assert!(!s.is_space_left());
    }

    #[test]
    fn spawn_policy_is_configurable() {
        let cfg = SimulatorConfig::new(4, 4).with_two_probability(0.0);
        let mut s = Simulator::with_config(cfg, StdRng::seed_from_u64(5)).unwrap();
        for _ in 0..10 {
            s.add_piece().unwrap();
        }
        assert!(s.grid().cells().iter().all(|&v| v == 0 || v == 4));
        assert_eq!(s.num_pieces(), 12);
    }

    #[test]
    fn display_has_footer() {
        let mut s = sim();
        clear(&mut s);
        s.set_piece_at(0, 0, 2).unwrap();
        let out = s.to_string();
        assert!(out.starts_with("\n   2   |"));
        assert!(out.ends_with("moves: 0 | points: 0\n"));
    }
}
