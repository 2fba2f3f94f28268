use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use minesweeper_ai::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[derive(Parser)]
#[command(name = "minesweeper-ai", version, about = "Knowledge-based minesweeper bot")]
struct Cli {
    /// TOML file with height, width, mines and seed.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Board height (overrides the config file).
    #[arg(long)]
    height: Option<usize>,

    /// Board width (overrides the config file).
    #[arg(long)]
    width: Option<usize>,

    /// Number of mines (overrides the config file).
    #[arg(long)]
    mines: Option<usize>,

    /// Seed for mine placement and guesses.
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, to make the game watchable.
    #[arg(long, default_value = "500")]
    delay_ms: u64,

    /// Cross-check every deduction with a SAT solver.
    #[arg(long)]
    audit: bool,

    /// Print the mine layout before playing.
    #[arg(long)]
    show_mines: bool,
}

impl Cli {
    fn game_config(&self) -> anyhow::Result<GameConfig> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(mines) = self.mines {
            config.mines = mines;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.game_config()?;

    // --- 1. Initialization ---
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::from_config(&config, &mut rng)?;
    tracing::info!(
        height = config.height,
        width = config.width,
        mines = config.mines,
        seed,
        "new game"
    );

    println!("--- Autonomous Minesweeper Bot ---");
    println!("Strategy: play proven-safe cells, guess randomly otherwise.");
    if cli.show_mines {
        println!("Mines:");
        print!("{}", game.board());
    }
    println!("Initial Board:");
    println!("{game}");

    // --- 2. Game Loop ---
    let mut move_count = 0;
    while game.state() == GameState::Playing {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);

        let Some(turn) = game.play_turn(&mut rng)? else {
            println!("No valid moves left for the bot to make.");
            break;
        };
        match turn.choice {
            Move::Safe(cell) => println!("Logic found a guaranteed safe cell: {cell}"),
            Move::Random(cell) => println!("No safe move known. Guessing {cell}..."),
        }
        println!("{game}");

        if cli.audit && turn.survived {
            let report = oracle::audit(game.agent(), game.revealed())?;
            if !report.is_sound() {
                anyhow::bail!("unsound deductions: {:?}", report.unsound);
            }
            tracing::info!(
                checked = report.checked,
                missed = report.missed.len(),
                "deductions verified"
            );
        }

        thread::sleep(Duration::from_millis(cli.delay_ms));
    }

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    let agent = game.agent();
    println!(
        "Moves: {}, mines found: {}/{}, safe cells known: {}",
        agent.moves_made().len(),
        agent.mines().len(),
        game.board().mine_count(),
        agent.safes().len()
    );
    match game.state() {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a mine and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }
    Ok(())
}
