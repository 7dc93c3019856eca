//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use eventharvest_core::aggregator::{FsSink, ProgressReporter, RunResult};
use eventharvest_shared::{init_config, load_config};
use eventharvest_sources::sources_from_config;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// EventHarvest — turn event listings into calendar files.
#[derive(Parser)]
#[command(
    name = "eventharvest",
    version,
    about = "Aggregate event listings from web sources into filtered iCalendar files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Path to the config file (defaults to ./eventharvest.toml, then
    /// ~/.eventharvest/eventharvest.toml).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
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
    /// Fetch all configured sources and write the calendar files.
    Run {
        /// Output directory for the .ics files (defaults to the current
        /// directory).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// List the configured sources and whether they are enabled.
    Sources,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone();
    match cli.command {
        Command::Run { out } => cmd_run(config_path.as_deref(), out).await,
        Command::Sources => cmd_sources(config_path.as_deref()),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(config_path.as_deref()),
        },
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

async fn cmd_run(config_path: Option<&std::path::Path>, out: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path)?;
    let sources = sources_from_config(&config.sources);

    if sources.is_empty() {
        println!("No sources configured.");
        println!("Add [[sources]] entries to eventharvest.toml (see `eventharvest config init`).");
        return Ok(());
    }

    let out_dir = out.unwrap_or_else(|| PathBuf::from("."));
    let sink = FsSink::new(&out_dir);

    info!(
        sources = sources.len(),
        out = %out_dir.display(),
        calendar = %config.calendar_name,
        "starting aggregation run"
    );

    let reporter = CliProgress::new();
    let result = eventharvest_core::run(&config, &sources, &sink, &reporter).await?;

    // Print summary
    println!();
    println!("  Aggregation complete!");
    println!("  Collected: {} events", result.events_collected);
    println!("  Kept:      {} events after filtering", result.events_kept);
    println!("  Calendars:");
    for (filename, count) in &result.calendars {
        println!("    {} ({count} events)", out_dir.join(filename).display());
    }
    println!("  Time:      {:.1}s", result.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn source_fetched(&self, kind: &str, url: &str, events: usize, current: usize, total: usize) {
        self.spinner
            .set_message(format!("Fetched [{current}/{total}] {kind} {url} — {events} events"));
    }

    fn calendar_written(&self, filename: &str, events: usize) {
        self.spinner
            .set_message(format!("Wrote {filename} ({events} events)"));
    }

    fn done(&self, _result: &RunResult) {
        self.spinner.finish_and_clear();
    }
}

// ---------------------------------------------------------------------------
// sources / config
// ---------------------------------------------------------------------------

fn cmd_sources(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = load_config(config_path)?;

    if config.sources.is_empty() {
        println!("No sources configured.");
        return Ok(());
    }

    println!("Configured sources:");
    for (i, source) in config.sources.iter().enumerate() {
        let status = if source.enabled { "enabled" } else { "disabled" };
        println!(
            "  {}. [{status}] {} {}",
            i + 1,
            source.source_type,
            source.url
        );
    }

    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created default config at {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let rendered = toml::to_string_pretty(&config)?;
    println!("{rendered}");
    Ok(())
}
