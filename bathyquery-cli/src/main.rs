//! BathyQuery CLI - Command-line interface
//!
//! Resolves seabed depth for coordinates typed on the command line or
//! imported from a survey CSV, and manages the configuration file.

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::common::RunArgs;
use commands::config::ConfigCommands;
use error::CliError;

#[derive(Debug, Parser)]
#[command(
    name = "bathyquery",
    version,
    about = "Bathymetry depth lookups against an ArcGIS MapServer"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve coordinates given on the command line
    Resolve {
        /// Coordinate in decimal degrees; repeat for more points
        #[arg(
            long = "point",
            num_args = 2,
            value_names = ["LAT", "LON"],
            required = true,
            allow_hyphen_values = true
        )]
        points: Vec<String>,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Resolve every coordinate in a survey CSV export
    Import {
        /// Semicolon-separated survey file
        file: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// View or edit configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    let result: Result<(), CliError> = match cli.command {
        Commands::Resolve { points, run } => commands::resolve::run(points, run),
        Commands::Import { file, run } => commands::import::run(&file, run),
        Commands::Config { command } => commands::config::run(command),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
