//! Players and the game loop that drives a [`Simulator`] with them.
//!
//! A [`Player`] only chooses directions; all rules stay in the simulator.

use log::{debug, info};
use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

use crate::engine::{MoveDirection, Score, Tile};
use crate::simulator::{Result, Simulator};

/// Consecutive blocked directions tolerated before the loop gives up on a player.
pub const MAX_IDLE_TURNS: u32 = 16;

/// Chooses the next direction for a game. `None` ends the game.
pub trait Player<R> {
    fn next_move(&mut self, sim: &Simulator<R>) -> Option<MoveDirection>;
}

/// Picks uniformly among the directions that change the board.
#[derive(Debug, Clone)]
pub struct RandomPlayer<P> {
    rng: P,
}

impl<P: Rng> RandomPlayer<P> {
    pub fn new(rng: P) -> Self {
        Self { rng }
    }
}

impl<R, P: Rng> Player<R> for RandomPlayer<P> {
    fn next_move(&mut self, sim: &Simulator<R>) -> Option<MoveDirection> {
        let possible: Vec<MoveDirection> =
            MoveDirection::ALL.into_iter().filter(|&d| sim.is_move_possible_in(d)).collect();
        possible.choose(&mut self.rng).copied()
    }
}

/// Replays a fixed list of directions, then stops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptedPlayer {
    moves: Vec<MoveDirection>,
    pos: usize,
}

impl ScriptedPlayer {
    pub fn new(moves: Vec<MoveDirection>) -> Self {
        Self { moves, pos: 0 }
    }

    /// Parse a move script.
    ///
    /// Tokens are separated by commas or whitespace. A token is either a
    /// direction name (`north`, `left`, `S`, ...) or a run of letters such as
    /// `NNEW`.
    ///
    /// ```
    /// use ttfe::{MoveDirection, ScriptedPlayer};
    /// let p = ScriptedPlayer::parse("NE, west s").unwrap();
    /// assert_eq!(p.moves(), &[MoveDirection::North, MoveDirection::East, MoveDirection::West, MoveDirection::South]);
    /// assert!(ScriptedPlayer::parse("nxs").is_err());
    /// ```
    pub fn parse(script: &str) -> Result<Self> {
        let mut moves = Vec::new();
        for token in script.split(|c: char| c == ',' || c.is_whitespace()).filter(|t| !t.is_empty()) {
            match token.parse::<MoveDirection>() {
                Ok(dir) => moves.push(dir),
                Err(err) => {
                    let letters: Option<Vec<MoveDirection>> = token.chars().map(MoveDirection::from_char).collect();
                    moves.extend(letters.ok_or(err)?);
                }
            }
        }
        Ok(Self::new(moves))
    }

    pub fn moves(&self) -> &[MoveDirection] {
        &self.moves
    }

    /// Directions not yet played.
    pub fn remaining(&self) -> usize {
        self.moves.len() - self.pos
    }
}

impl<R> Player<R> for ScriptedPlayer {
    fn next_move(&mut self, _sim: &Simulator<R>) -> Option<MoveDirection> {
        let dir = self.moves.get(self.pos).copied();
        if dir.is_some() {
            self.pos += 1;
        }
        dir
    }
}

/// Outcome of [`play_game`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameSummary {
    /// Moves that changed the board during this loop.
    pub moves: u64,
    /// Directions the player chose that left the board unchanged.
    pub rejected: u64,
    pub points: Score,
    pub highest_piece: Tile,
    /// True if the loop ended because no direction could change the board.
    pub game_over: bool,
}

/// Let `player` drive `sim` until no move is possible, the player stops, or
/// `max_turns` directions have been requested.
pub fn play_game<R, P>(sim: &mut Simulator<R>, player: &mut P, max_turns: Option<u64>) -> GameSummary
where
    R: Rng,
    P: Player<R> + ?Sized,
{
    play_game_with(sim, player, max_turns, |_, _| {})
}

/// Like [`play_game`], calling `on_move` after every move that changed the board.
pub fn play_game_with<R, P, F>(
    sim: &mut Simulator<R>,
    player: &mut P,
    max_turns: Option<u64>,
    mut on_move: F,
) -> GameSummary
where
    R: Rng,
    P: Player<R> + ?Sized,
    F: FnMut(&Simulator<R>, MoveDirection),
{
    let start_moves = sim.num_moves();
    let mut turns = 0u64;
    let mut rejected = 0u64;
    let mut idle = 0u32;

    while sim.is_move_possible() && max_turns.map_or(true, |limit| turns < limit) && idle < MAX_IDLE_TURNS {
        let Some(dir) = player.next_move(sim) else {
            debug!("player stopped after {turns} turn(s)");
            break;
        };
        turns += 1;
        if sim.perform_move(dir) {
            idle = 0;
            on_move(sim, dir);
        } else {
            rejected += 1;
            idle += 1;
        }
    }

    let summary = GameSummary {
        moves: sim.num_moves() - start_moves,
        rejected,
        points: sim.points(),
        highest_piece: sim.highest_piece(),
        game_over: !sim.is_move_possible(),
    };
    info!(
        "game finished: {} move(s), {} rejected, {} points, highest piece {}{}",
        summary.moves,
        summary.rejected,
        summary.points,
        summary.highest_piece,
        if summary.game_over { " (no moves left)" } else { "" }
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn random_player_runs_to_game_over() {
        let mut sim = Simulator::from_seed(4, 4, 11).unwrap();
        let mut player = RandomPlayer::new(StdRng::seed_from_u64(12));
        let summary = play_game(&mut sim, &mut player, None);
        assert!(summary.game_over);
        assert!(!sim.is_move_possible());
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.moves, sim.num_moves());
        assert_eq!(summary.points, sim.points());
        assert!(summary.highest_piece >= 8);
    }

    #[test]
    fn random_player_is_reproducible() {
        let run = || {
            let mut sim = Simulator::from_seed(4, 4, 5).unwrap();
            let mut player = RandomPlayer::new(StdRng::seed_from_u64(6));
            (play_game(&mut sim, &mut player, Some(50)), sim.rows())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn turn_budget_is_respected() {
        let mut sim = Simulator::from_seed(4, 4, 1).unwrap();
        let mut player = RandomPlayer::new(StdRng::seed_from_u64(2));
        let summary = play_game(&mut sim, &mut player, Some(3));
        assert_eq!(summary.moves, 3);
        assert!(!summary.game_over);
    }

    #[test]
    fn scripted_player_counts_rejections() {
        let mut sim = Simulator::from_seed(4, 4, 0).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                sim.set_piece_at(x, y, 0).unwrap();
            }
        }
        sim.set_piece_at(0, 0, 2).unwrap();
        // WEST and NORTH are blocked for a lone piece in the top-left corner.
        let mut player = ScriptedPlayer::parse("west north").unwrap();
        let summary = play_game(&mut sim, &mut player, None);
        assert_eq!(summary.moves, 0);
        assert_eq!(summary.rejected, 2);
        assert_eq!(player.remaining(), 0);
        assert!(!summary.game_over);
    }

    #[test]
    fn observer_sees_every_committed_move() {
        let mut sim = Simulator::from_seed(4, 4, 21).unwrap();
        let mut player = RandomPlayer::new(StdRng::seed_from_u64(22));
        let mut seen = Vec::new();
        let summary = play_game_with(&mut sim, &mut player, Some(20), |s, dir| seen.push((s.num_moves(), dir)));
        assert_eq!(seen.len() as u64, summary.moves);
        assert!(seen.iter().enumerate().all(|(i, &(n, _))| n == i as u64 + 1));
    }

    #[test]
    fn stubborn_player_is_stopped() {
        struct AlwaysNorth;
        impl<R> Player<R> for AlwaysNorth {
            fn next_move(&mut self, _sim: &Simulator<R>) -> Option<MoveDirection> {
                Some(MoveDirection::North)
            }
        }
        let mut sim = Simulator::from_seed(4, 4, 3).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                sim.set_piece_at(x, y, 0).unwrap();
            }
        }
        sim.set_piece_at(2, 0, 4).unwrap();
        let summary = play_game(&mut sim, &mut AlwaysNorth, None);
        assert_eq!(summary.moves, 0);
        assert_eq!(summary.rejected, u64::from(MAX_IDLE_TURNS));
        assert!(!summary.game_over);
    }

    #[test]
    fn parse_rejects_unknown_letters() {
        assert!(ScriptedPlayer::parse("north,q").is_err());
        assert_eq!(ScriptedPlayer::parse("").unwrap().remaining(), 0);
        assert_eq!(ScriptedPlayer::parse("up down left right").unwrap().moves().len(), 4);
    }
}
