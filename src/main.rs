mod commands;
mod prompt;
mod render;
mod sheet;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use calsheet_core::config::AppConfig;
use calsheet_core::date_range::DateRange;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calsheet")]
#[command(about = "Mirror a calendar against a spreadsheet-like table")]
struct Cli {
    /// Use this config file instead of ~/.config/calsheet/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show debug output (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update the table from the calendar
    Pull {
        /// Pull events from this date (YYYY-MM-DD, or "start" for all past events)
        #[arg(long)]
        from: Option<String>,

        /// Pull events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },
    /// Update the calendar from the table
    Push {
        /// Push against events from this date (YYYY-MM-DD, or "start" for all past events)
        #[arg(long)]
        from: Option<String>,

        /// Push against events until this date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,

        /// Delete calendar events missing from the table without asking
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref())?;
    let default_range = config.sync.window()?;

    match cli.command {
        Commands::Pull { from, to } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref(), &default_range)
                .map_err(|e| anyhow::anyhow!(e))?;
            commands::pull::run(&config, range).await
        }
        Commands::Push { from, to, yes } => {
            let range = DateRange::from_args(from.as_deref(), to.as_deref(), &default_range)
                .map_err(|e| anyhow::anyhow!(e))?;
            commands::push::run(&config, range, yes).await
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info,calsheet=debug,calsheet_core=debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
