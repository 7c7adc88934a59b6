//! runlog CLI entry point.
//!
//! Parses command-line arguments and dispatches to the appropriate command handler.

use clap::{Parser, Subcommand};
use runlog::commands::{config_command, list_command, rename_command, show_command};
use runlog::config::{config_path, load_config_from};
use runlog::output::{print_error, print_warning};
use runlog::{DialogState, FileStore};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "RUNLOG_LOG";

#[derive(Parser)]
#[command(name = "runlog")]
#[command(
    version,
    about = "Manage persisted run records: list, inspect and safely rename runs",
    after_help = "EXAMPLES:
    runlog list                      # Show every run and its name
    runlog show run_001              # Show one run record
    runlog rename run_001 \"Best run\" # Rename a run
    runlog --dir ./runs list         # Use a specific storage directory"
)]
struct Cli {
    /// Storage directory holding `<key>.json` run records (overrides config)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Path to the config file (default: ~/.config/runlog/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log storage activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all runs with their display names
    List,

    /// Show every field of one run
    Show {
        /// File key of the run (file name without `.json`)
        key: String,
    },

    /// Give a run a new display name
    Rename {
        /// File key of the run (file name without `.json`)
        key: String,

        /// The new display name; must not be used by any other run
        name: String,
    },

    /// Show the effective configuration
    Config,
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("runlog=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> runlog::Result<bool> {
    let config_file = match cli.config {
        Some(path) => path,
        None => config_path()?,
    };
    let mut config = load_config_from(&config_file)?;
    if let Some(dir) = cli.dir {
        config.storage_dir = Some(dir);
    }
    let store = FileStore::from_config(&config)?;

    match cli.command {
        Commands::List => {
            if !store.dir().exists() {
                print_warning(&format!(
                    "Storage directory {} does not exist",
                    store.dir().display()
                ));
            }
            list_command(&store)?;
            Ok(true)
        }
        Commands::Show { key } => {
            show_command(&store, &key)?;
            Ok(true)
        }
        Commands::Rename { key, name } => {
            let state = rename_command(store, &config, &key, &name)?;
            Ok(matches!(state, DialogState::Success(_) | DialogState::Idle))
        }
        Commands::Config => {
            config_command(&config_file, &store, &config)?;
            Ok(true)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}
