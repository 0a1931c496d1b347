//! CLI frontend for Tale: play branching stories with save slots.

mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "tale",
    about = "Tale: play branching stories with save slots",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a story interactively
    Play {
        /// Compiled story script (default: the bundled demo story)
        #[arg(short, long)]
        script: Option<PathBuf>,

        /// Directory holding the save slots
        #[arg(long, default_value = "saves")]
        saves: PathBuf,

        /// JSON session config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List save slots
    Slots {
        /// Directory holding the save slots
        #[arg(long, default_value = "saves")]
        saves: PathBuf,

        /// JSON session config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Delete a save slot
    Delete {
        /// Slot number (1-based)
        slot: usize,

        /// Directory holding the save slots
        #[arg(long, default_value = "saves")]
        saves: PathBuf,

        /// JSON session config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Validate a compiled story script
    Check {
        /// Compiled story script (default: the bundled demo story)
        #[arg(short, long)]
        script: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Play {
            script,
            saves,
            config,
        } => commands::play::run(script.as_deref(), &saves, config.as_deref()),
        Commands::Slots { saves, config } => commands::slots::run(&saves, config.as_deref()),
        Commands::Delete {
            slot,
            saves,
            config,
        } => commands::delete::run(slot, &saves, config.as_deref()),
        Commands::Check { script } => commands::check::run(script.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
