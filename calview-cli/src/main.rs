mod commands;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use calview_core::{Locale, LocaleConfig};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "calview")]
#[command(about = "Inspect and reschedule single iCalendar events")]
struct Cli {
    /// Locale configuration file (defaults to ~/.config/calview/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the short label of an event for one day
    Show {
        file: String,

        /// Day to render (YYYY-MM-DD), defaults to the event's first day
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Print the long description of an event
    Describe { file: String },
    /// Print the event re-serialized as ICS
    Raw { file: String },
    /// Print the week containing a day, with the event's label on each day it covers
    Week {
        file: String,

        /// Any day of the week to render (YYYY-MM-DD), defaults to the event's first day
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },
    /// Give an event new start and end times and print the result as ICS
    Move {
        file: String,

        /// New start (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
        #[arg(short, long)]
        start: String,

        /// New end (YYYY-MM-DD or YYYY-MM-DDTHH:MM)
        #[arg(short, long)]
        end: String,

        /// Anchor the new times in this zone instead of keeping them floating
        #[arg(long)]
        tz: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.debug);
    let locale = Arc::new(load_locale(cli.config.as_deref())?);

    match cli.command {
        Commands::Show { file, date } => commands::show::run(&expand(&file), date, locale),
        Commands::Describe { file } => commands::describe::run(&expand(&file), locale),
        Commands::Raw { file } => commands::raw::run(&expand(&file), locale),
        Commands::Week { file, date } => commands::week::run(&expand(&file), date, locale),
        Commands::Move {
            file,
            start,
            end,
            tz,
        } => commands::reschedule::run(&expand(&file), &start, &end, tz.as_deref(), locale),
    }
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--debug`.
fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_locale(path: Option<&str>) -> Result<Locale> {
    let path = match path {
        Some(path) => expand(path),
        None => LocaleConfig::default_path()?,
    };

    let raw = LocaleConfig::load(Some(path.as_path()))
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::debug!(?raw, "locale configuration");

    Locale::try_from(raw).context("Invalid locale configuration")
}

fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).as_ref())
}
