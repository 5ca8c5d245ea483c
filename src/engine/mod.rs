//! Engine module: the board type and the rule-free slide/merge operations.
//!
//! - `Grid` is the `width x height` tile storage with rendering.
//! - `MoveDirection` is the closed set of four slide directions.
//! - Free functions (`shift`, `slide_line`, `is_move_possible`, ...) implement
//!   move resolution and legality without touching score or randomness.

mod ops;
pub mod state;

pub use state::{Grid, MoveDirection, Score, Tile};

pub use ops::{is_game_over, is_move_possible, is_valid_tile, line_can_move, shift, slide_line, Shifted};

pub(crate) use ops::{generate_random_tile, random_empty_cell};
