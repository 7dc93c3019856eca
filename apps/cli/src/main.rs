//! EventHarvest CLI — aggregate event listings into iCalendar files.
//!
//! Scrapes configured web sources (CSS selectors or schema.org JSON-LD),
//! filters the collected events, and writes `.ics` calendars.

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
