mod commands;
mod config;
mod render;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::expand::ExpandOptions;
use crate::config::OutputFormat;

#[derive(Parser)]
#[command(name = "recurra")]
#[command(about = "Expand recurring activity rules into concrete occurrences")]
struct Cli {
    /// Show debug logging (overridden by RECURRA_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of ~/.config/recurra/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand a rule file into its occurrences
    Expand {
        /// Rule file (.toml or .json)
        file: PathBuf,

        /// Series id used to derive occurrence ids (defaults to the file's seriesId)
        #[arg(short, long)]
        series: Option<String>,

        /// Capacity copied onto every occurrence
        #[arg(short, long)]
        capacity: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Describe a rule file in plain language
    Describe {
        /// Rule file (.toml or .json)
        file: PathBuf,
    },
    /// Validate a rule file and report how many occurrences it produces
    Check {
        /// Rule file (.toml or .json)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => config::load_config_from(path)?,
        None => config::load_config()?,
    };

    match cli.command {
        Commands::Expand {
            file,
            series,
            capacity,
            format,
            output,
        } => {
            let options = ExpandOptions {
                series,
                capacity,
                format,
                output,
            };
            commands::expand::run(&file, options, &config)
        }
        Commands::Describe { file } => commands::describe::run(&file),
        Commands::Check { file } => commands::check::run(&file),
    }
}

/// Log to stderr so stdout stays clean for JSON and ICS output
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("RECURRA_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
