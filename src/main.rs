use std::path::PathBuf;

use clap::Parser;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use meeple_rules_engine::engine::arena::run_arena;
use meeple_rules_engine::engine::config::{load_config, load_default_config};
use meeple_rules_engine::engine::simulator::{new_random_game, play_out};

#[derive(Parser)]
#[command(
    name = "meeple-rules-engine",
    about = "Run seeded random tile-placement playouts and report scores"
)]
struct Cli {
    /// Path to meeple_rules.toml (default: auto-discover)
    #[arg(long, env = "MEEPLE_RULES_CONFIG")]
    config: Option<PathBuf>,

    /// Number of players
    #[arg(long, env = "MEEPLE_PLAYERS")]
    players: Option<usize>,

    /// Number of games to play
    #[arg(long, env = "MEEPLE_GAMES")]
    games: Option<usize>,

    /// Base random seed
    #[arg(long, env = "MEEPLE_SEED")]
    seed: Option<u64>,

    /// Tokens per player
    #[arg(long)]
    meeples: Option<u32>,

    /// Copies of the tile bag in each deck
    #[arg(long)]
    deck_copies: Option<usize>,

    /// Undo every game after playing it and check the state round-trips
    #[arg(long)]
    undo: bool,

    /// Print the results as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Play a single game with the base seed and print the final board
    #[arg(long)]
    show_board: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => load_config(path)?,
        None => load_default_config(),
    };
    if let Some(players) = cli.players {
        config.players = players;
    }
    if let Some(games) = cli.games {
        config.games = games;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(meeples) = cli.meeples {
        config.meeples_per_player = meeples;
    }
    if let Some(copies) = cli.deck_copies {
        config.deck_copies = copies;
    }
    config.undo_after |= cli.undo;
    config.validate()?;

    if cli.show_board {
        let mut game = new_random_game(&config, config.seed)?;
        let mut rng = rand::rngs::StdRng::seed_from_u64(config.seed);
        let (placed, skipped) = play_out(&mut game, &mut rng)?;
        print!("{}", game.board);
        println!("placed {placed}, skipped {skipped}");
        println!("official scores: {:?}", game.scores());
        println!("final scores:    {:?}", game.final_scores());
        return Ok(());
    }

    let result = run_arena(&config)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.summary());
    }
    Ok(())
}
