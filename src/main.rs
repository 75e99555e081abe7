//! uctgo: a root-parallel UCT/RAVE Go engine.
//!
//! ## Usage
//!
//! - `uctgo` - Run a short search demo
//! - `uctgo gtp` - Start a GTP server for GUI integration
//! - `uctgo demo` - Run the search demo explicitly

use clap::{Parser, Subcommand};

use uctgo::config::Config;
use uctgo::engine::Engine;
use uctgo::gtp::GtpEngine;
use uctgo::position::{str_coord, Color, Position};

/// uctgo: a root-parallel UCT/RAVE Go engine
#[derive(Parser)]
#[command(name = "uctgo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Comma-separated `key=value` engine configuration, e.g.
    /// `threads=4,games=20000,resign_ratio=0.2`.
    #[arg(long, global = true, default_value = "")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the GTP (Go Text Protocol) server for use with GUI applications
    Gtp,
    /// Run a short search demo
    Demo,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let cfg = match Config::parse(&cli.config) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("invalid --config: {err:#}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Gtp) => {
            let mut engine = GtpEngine::new(cfg);
            engine.run();
        }
        Some(Commands::Demo) | None => run_demo(cfg),
    }
}

fn run_demo(mut cfg: Config) {
    println!("uctgo: root-parallel UCT/RAVE Go engine\n");

    if cfg.games == Config::default().games {
        // Keep the demo fast when the user hasn't asked for a full budget.
        cfg.games = 2000;
    }

    let board = Position::new();
    let mut engine = Engine::new(cfg);

    println!("Searching from an empty board...");
    match engine.genmove(&board, Color::Black) {
        Ok(mv) => println!("Best move for Black: {}", str_coord(mv)),
        Err(err) => eprintln!("search failed: {err:#}"),
    }

    if let Some(report) = engine.chat("winrate") {
        println!("{report}");
    }
}
