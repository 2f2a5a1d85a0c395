//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use recordings_core::{Catalog, EventFailure, LoadState, MediaOutcome};
use recordings_shared::{AppConfig, Talk, init_config, init_config_at, load_config, load_config_from};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Recordings: conference schedules annotated with their published recordings.
#[derive(Parser)]
#[command(
    name = "recordings",
    version,
    about = "Aggregate conference schedules and match published recordings to talks.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.recordings/recordings.toml).
    #[arg(long, global = true, env = "RECORDINGS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List configured events with their load status.
    Events,

    /// List talks across all events.
    Talks {
        /// Only talks with at least one recording.
        #[arg(long)]
        with_media: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file.
    InitConfig {
        /// Replace an existing config file.
        #[arg(long)]
        force: bool,
    },

    /// Show the resolved configuration.
    Config,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so listings stay pipeable.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "recordings=info",
        1 => "recordings=debug",
        _ => "recordings=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Events => cmd_events(&resolve_config(cli.config.as_ref())?).await,
        Command::Talks { with_media, json } => {
            cmd_talks(&resolve_config(cli.config.as_ref())?, with_media, json).await
        }
        Command::InitConfig { force } => cmd_init_config(cli.config.as_ref(), force),
        Command::Config => cmd_config(&read_config(cli.config.as_ref())?),
    }
}

fn read_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    Ok(match path {
        Some(p) => load_config_from(p)?,
        None => load_config()?,
    })
}

/// Config for commands that load events; an empty event list is an error.
fn resolve_config(path: Option<&PathBuf>) -> Result<AppConfig> {
    let config = read_config(path)?;
    if config.events.is_empty() {
        return Err(eyre!(
            "no events configured. Run `recordings init-config` and add [[events]] entries."
        ));
    }
    Ok(config)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_events(config: &AppConfig) -> Result<()> {
    info!(events = config.events.len(), "loading events");

    let catalog = Catalog::new(config)?;
    for event in catalog.events().await {
        match &event.state {
            LoadState::Loaded(loaded) => {
                let with_media = loaded.talks.iter().filter(|t| t.has_media()).count();
                let media = match &loaded.media {
                    MediaOutcome::NotConfigured => "no listing".to_string(),
                    MediaOutcome::Unavailable(_) => "listing unavailable".to_string(),
                    MediaOutcome::InvalidPattern(_) => "invalid filename pattern".to_string(),
                    MediaOutcome::Matched(stats) if stats.dropped() > 0 => {
                        format!("{with_media} with media, {} unmatched", stats.dropped())
                    }
                    MediaOutcome::Matched(_) => format!("{with_media} with media"),
                };
                println!(
                    "  {:<20} {} ({}): {} talks, {media}",
                    event.label(),
                    event.title(),
                    event.city(),
                    loaded.talks.len(),
                );
            }
            LoadState::Failed(error) => {
                println!("  {:<20} FAILED: {error}", event.label());
            }
            LoadState::Unloaded => {
                println!("  {:<20} not loaded", event.label());
            }
        }
    }

    Ok(())
}

async fn cmd_talks(config: &AppConfig, with_media: bool, json: bool) -> Result<()> {
    let catalog = Catalog::new(config)?;
    let listing = catalog.talks().await;

    let talks: Vec<&Talk> = listing
        .talks
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| !with_media || t.has_media())
        .collect();

    info!(talks = talks.len(), failed_events = listing.failures.len(), "talks listed");

    if json {
        let rows: Vec<serde_json::Value> = talks.iter().map(|t| talk_json(t)).collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for talk in &talks {
            let marker = if talk.has_media() { "*" } else { " " };
            println!(
                "{marker} [{}] {:>6}  {}  ({})",
                talk.conference.title,
                talk.id,
                talk.title,
                talk.person_names()
            );
            for file in &talk.files {
                println!("           {file}");
            }
        }
    }

    report_failures(&listing.failures);
    Ok(())
}

fn cmd_init_config(path: Option<&PathBuf>, force: bool) -> Result<()> {
    let written = match path {
        Some(p) => init_config_at(p, force)?,
        None => init_config(force)?,
    };
    println!("Wrote default config to {}", written.display());
    Ok(())
}

fn cmd_config(config: &AppConfig) -> Result<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn talk_json(talk: &Talk) -> serde_json::Value {
    serde_json::json!({
        "event": talk.conference.as_ref(),
        "talk": talk,
        "has_media": talk.has_media(),
    })
}

fn report_failures(failures: &[EventFailure]) {
    for failure in failures {
        eprintln!("warning: event '{}' could not be loaded: {}", failure.event, failure.error);
    }
}
