//! Recordings CLI: conference schedules merged with published recordings.
//!
//! Loads every configured event's schedule and media listing and prints the
//! resulting catalog.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
