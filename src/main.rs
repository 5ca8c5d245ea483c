use std::path::PathBuf;

use clap::Parser;
use rand::{rngs::StdRng, SeedableRng};
use ttfe::{play_game_with, Player, RandomPlayer, ScriptedPlayer, Simulator, SimulatorConfig};

#[derive(Parser, Debug)]
#[command(name = "ttfe", version, about = "Play one game of the 2048 sliding-tile puzzle")]
struct Args {
    /// TOML config file (width, height, [spawn] two_probability)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,
    /// Board width (overrides the config file)
    #[arg(long)]
    width: Option<usize>,
    /// Board height (overrides the config file)
    #[arg(long)]
    height: Option<usize>,
    /// Seed for the board's spawns and the random player
    #[arg(short = 's', long, default_value_t = 0)]
    seed: u64,
    /// Stop after this many player turns
    #[arg(long)]
    max_moves: Option<u64>,
    /// Play these directions instead of random ones, e.g. "NNEW" or "north,east"
    #[arg(long, value_name = "MOVES")]
    script: Option<String>,
    /// Only print the final summary
    #[arg(short = 'q', long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulatorConfig::from_toml(path)?,
        None => SimulatorConfig::default(),
    };
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }

    let mut sim = Simulator::with_config(config, StdRng::seed_from_u64(args.seed))?;
    let mut player: Box<dyn Player<StdRng>> = match &args.script {
        Some(script) => Box::new(ScriptedPlayer::parse(script)?),
        // Derived seed so the player's picks do not mirror the board's spawns.
        None => Box::new(RandomPlayer::new(StdRng::seed_from_u64(args.seed ^ 0x9e37_79b9_7f4a_7c15))),
    };

    if !args.quiet {
        println!("{}", sim);
    }
    let quiet = args.quiet;
    let summary = play_game_with(&mut sim, player.as_mut(), args.max_moves, |s, dir| {
        if !quiet {
            println!("{dir}\n{s}");
        }
    });

    println!(
        "Moves made: {}, rejected: {}, points: {}, highest piece: {}{}",
        summary.moves,
        summary.rejected,
        summary.points,
        summary.highest_piece,
        if summary.game_over { ", game over" } else { "" }
    );
    Ok(())
}
