//! indexa - command-line front end
//!
//! # Commands
//!
//! - `indexa compose` - build the composite table (price index, currency, alternative
//!   estimate, recomposed ratio, panel columns) over a date range
//! - `indexa observe` - nearest or latest observation of a series, or the inflation
//!   between two dates
//!
//! Connectors are chosen from the keys on the command line or in the environment
//! (`EVDS_API_KEY`, `FRED_API_KEY`); `--mock` swaps in the offline fixture connector.

use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

mod commands;
mod connectors;
mod output;

/// Compose and deflate macroeconomic series from several data providers.
#[derive(Parser)]
#[command(name = "indexa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use the offline fixture connector instead of remote providers
    #[arg(long, global = true)]
    mock: bool,

    /// EVDS API key
    #[arg(long, global = true, env = "EVDS_API_KEY", hide_env_values = true)]
    evds_key: Option<String>,

    /// FRED API key
    #[arg(long, global = true, env = "FRED_API_KEY", hide_env_values = true)]
    fred_key: Option<String>,

    /// Race providers instead of trying them in priority order
    #[arg(long, global = true)]
    latency: bool,

    /// Per-provider timeout in seconds
    #[arg(long, global = true, default_value_t = 15)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compose the real-price table over a date range
    Compose(commands::compose::ComposeArgs),

    /// Look up observations or compute inflation between two dates
    Observe(commands::observe::ObserveArgs),
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let indexa = connectors::build(&connectors::ConnectorArgs {
        mock: cli.mock,
        evds_key: cli.evds_key.as_deref(),
        fred_key: cli.fred_key.as_deref(),
        latency: cli.latency,
        provider_timeout: Duration::from_secs(cli.timeout_secs),
    })?;

    match cli.command {
        Commands::Compose(args) => commands::compose::run(&indexa, args).await,
        Commands::Observe(args) => commands::observe::run(&indexa, args).await,
    }
}
