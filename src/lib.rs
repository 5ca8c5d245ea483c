//! ttfe: a deterministic, seedable 2048-style sliding-tile simulator
//!
//! This crate provides:
//! - A `Simulator` that owns the board, score, move counter and random source
//! - Rule-free slide/merge primitives on a `width x height` `Grid` (`engine` module)
//! - A TOML-loadable `SimulatorConfig` (dimensions, 2-vs-4 spawn probability)
//! - A `Player` seam with random and scripted players plus a `play_game` loop
//!
//! Quick start:
//! ```
//! use ttfe::{MoveDirection, Simulator};
//!
//! // Deterministic game: same seed, same spawns
//! let mut sim = Simulator::from_seed(4, 4, 42).unwrap();
//!
//! // Set up an arbitrary board
//! for y in 0..4 {
//!     for x in 0..4 {
//!         sim.set_piece_at(x, y, 0).unwrap();
//!     }
//! }
//! sim.set_piece_at(0, 0, 2).unwrap();
//! sim.set_piece_at(0, 2, 2).unwrap();
//!
//! assert!(sim.is_move_possible_in(MoveDirection::North));
//! assert!(sim.perform_move(MoveDirection::North));
//! assert_eq!(sim.piece_at(0, 0).unwrap(), 4);
//! assert_eq!(sim.points(), 4);
//! assert_eq!(sim.num_pieces(), 2); // merged piece + spawn
//! ```
//!
//! Full loop with a random player:
//! ```
//! use rand::{rngs::StdRng, SeedableRng};
//! use ttfe::{play_game, RandomPlayer, Simulator};
//!
//! let mut sim = Simulator::from_seed(4, 4, 123).unwrap();
//! let mut player = RandomPlayer::new(StdRng::seed_from_u64(1));
//! let summary = play_game(&mut sim, &mut player, Some(10));
//! assert_eq!(summary.moves, 10);
//! println!("{sim}");
//! ```

pub mod config;
pub mod engine;
pub mod player;
pub mod simulator;

pub use crate::config::{ConfigError, SimulatorConfig, SpawnPolicy};
pub use crate::engine::{Grid, MoveDirection, Score, Tile};
pub use crate::player::{play_game, play_game_with, GameSummary, Player, RandomPlayer, ScriptedPlayer};
pub use crate::simulator::{create_simulator, Simulator, SimulatorError, INITIAL_PIECES};
