//! CLI frontend for the entity class declaration engine.

mod commands;
mod config;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ec",
    about = "Inspect entity class and model declarations",
    version,
    propagate_version = true
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: <dir>/ec.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load all declarations and report diagnostics
    Check {
        /// Definitions root containing the def/ directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// List entity classes
    List {
        /// Filter by class type (light, speaker, model, generic, static)
        #[arg(short = 't', long = "type")]
        class_type: Option<String>,

        /// Include hidden classes
        #[arg(short, long)]
        all: bool,

        /// Definitions root containing the def/ directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Show detailed information about an entity class
    Show {
        /// Entity class name (case-sensitive)
        name: String,

        /// Only show attributes declared on the class itself
        #[arg(short, long)]
        local: bool,

        /// Definitions root containing the def/ directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// List model definitions
    Models {
        /// Definitions root containing the def/ directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Show a resolved model definition
    Model {
        /// Model name (case-sensitive)
        name: String,

        /// Definitions root containing the def/ directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },

    /// Export all resolved classes and models as JSON
    Export {
        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Definitions root containing the def/ directory
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

impl Commands {
    fn dir(&self) -> &PathBuf {
        match self {
            Self::Check { dir }
            | Self::List { dir, .. }
            | Self::Show { dir, .. }
            | Self::Models { dir }
            | Self::Model { dir, .. }
            | Self::Export { dir, .. } => dir,
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = config::CliConfig::load(cli.command.dir(), cli.config.as_deref())
        .map_err(|e| format!("cannot load config: {e}"))
        .and_then(|config| run(cli.command, &config));

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(command: Commands, config: &config::CliConfig) -> Result<(), String> {
    match command {
        Commands::Check { dir } => commands::check::run(&dir, config),
        Commands::List {
            class_type,
            all,
            dir,
        } => commands::list::run(&dir, config, class_type.as_deref(), all),
        Commands::Show { name, local, dir } => commands::show::run(&dir, config, &name, local),
        Commands::Models { dir } => commands::models::run(&dir, config),
        Commands::Model { name, dir } => commands::model::run(&dir, config, &name),
        Commands::Export { output, dir } => {
            commands::export::run(&dir, config, output.as_deref())
        }
    }
}
