use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use sweeper_core::*;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use settings::Settings;
use store::{BoardId, BoardStore};

mod settings;
mod store;

#[derive(Parser, Debug)]
#[command(version, about = "Minesweeper boards kept on disk", long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Settings file (TOML)
    #[arg(long, env = "SWEEPER_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the boards, overrides the settings file
    #[arg(long, env = "SWEEPER_STORE", global = true)]
    store: Option<PathBuf>,

    /// Print boards as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Create a board and place its mines
    New {
        /// Named size, defaults to the one in the settings file
        #[arg(long, conflicts_with_all = ["rows", "columns", "mines"])]
        preset: Option<Preset>,
        #[arg(long, requires_all = ["columns", "mines"])]
        rows: Option<Coord>,
        #[arg(long, requires_all = ["rows", "mines"])]
        columns: Option<Coord>,
        #[arg(long, requires_all = ["rows", "columns"])]
        mines: Option<CellCount>,
        /// Force a seed instead of random
        #[arg(short, long)]
        seed: Option<u64>,
    },
    /// Show a board
    Show { id: BoardId },
    /// List stored boards
    List,
    /// Reveal a cell
    Reveal { id: BoardId, row: Coord, col: Coord },
    /// Flag or unflag a cell
    Flag { id: BoardId, row: Coord, col: Coord },
    /// Pause the game clock
    Pause { id: BoardId },
    /// Resume a paused game
    Resume { id: BoardId },
}

#[derive(Serialize)]
struct BoardView<'a> {
    id: &'a BoardId,
    #[serde(flatten)]
    snapshot: BoardSnapshot,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose);

    let mut settings = Settings::load(args.config.as_deref())?;
    if let Some(store_dir) = args.store {
        settings.store_dir = store_dir;
    }
    tracing::debug!(?settings, "Settings loaded");

    let store = BoardStore::open(&settings.store_dir)
        .with_context(|| format!("Could not open store {}", settings.store_dir.display()))?;
    let clock = SystemClock;

    let command = match args.action {
        Action::New {
            preset,
            rows,
            columns,
            mines,
            seed,
        } => {
            let dimensions = match (rows, columns, mines) {
                (Some(rows), Some(columns), Some(mines)) => Some((rows, columns, mines)),
                _ => None,
            };
            let config = settings.board_config(preset, dimensions)?;
            let seed = settings.resolve_seed(seed);
            tracing::debug!(?config, seed, "Creating board");

            let mut rng = StdRng::seed_from_u64(seed);
            let board = Board::from_config(config, &mut rng, &clock)?;
            let id = store.create(&board, &mut rng)?;
            return print_board(&id, &board, &clock, args.json);
        }
        Action::Show { id } => {
            let board = store.load(&id)?;
            return print_board(&id, &board, &clock, args.json);
        }
        Action::List => {
            for id in store.list()? {
                let board = store.load(&id)?;
                println!(
                    "{}  {}x{}  {:<8} {}",
                    id,
                    board.rows(),
                    board.columns(),
                    board.status(),
                    board.result()
                );
            }
            return Ok(());
        }
        Action::Reveal { id, row, col } => (id, Command::Reveal { row, col }),
        Action::Flag { id, row, col } => (id, Command::Flag { row, col }),
        Action::Pause { id } => (id, Command::Pause),
        Action::Resume { id } => (id, Command::Resume),
    };

    let (id, command) = command;
    let (board, outcome) = store.update(&id, |board| board.apply(command, &clock))?;
    tracing::info!(%id, ?command, ?outcome, "Move applied");
    if !args.json {
        println!("{}", describe(outcome));
    }
    print_board(&id, &board, &clock, args.json)
}

fn init_logging(verbose: &Verbosity<WarnLevel>) {
    let default_level = verbose.log_level_filter().to_string().to_lowercase();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn describe(outcome: CommandOutcome) -> &'static str {
    match outcome {
        CommandOutcome::Reveal(RevealOutcome::Revealed) => "Revealed.",
        CommandOutcome::Reveal(RevealOutcome::HitMine) => "Boom! You hit a mine.",
        CommandOutcome::Reveal(RevealOutcome::Won) => "All safe cells revealed, you won!",
        CommandOutcome::Flag(FlagOutcome::Flagged) => "Flagged.",
        CommandOutcome::Flag(FlagOutcome::Unflagged) => "Flag removed.",
        CommandOutcome::Paused => "Paused.",
        CommandOutcome::Resumed => "Resumed.",
    }
}

fn print_board(id: &BoardId, board: &Board, clock: &impl Clock, json: bool) -> anyhow::Result<()> {
    let snapshot = BoardSnapshot::capture(board, clock.now());
    if json {
        let view = BoardView { id, snapshot };
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    println!(
        "Board {}: {} ({}), mines left {}, elapsed {}s",
        id, snapshot.status, snapshot.result, snapshot.mines_left, snapshot.elapsed_secs
    );
    print!("{}", board.render());
    Ok(())
}
