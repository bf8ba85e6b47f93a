//! Link-Ripper main entry point
//!
//! This is the command-line interface for the Link-Ripper link extractor.

use anyhow::Context;
use clap::{Parser, Subcommand};
use link_ripper::config::{apply_env_overrides, load_config_with_hash, Config};
use link_ripper::output::{format_statistics, render_json, RipStatistics};
use link_ripper::url::parse_target;
use link_ripper::{RipOutcome, Ripper};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Link-Ripper: extract every link from a web page
///
/// Fetches one page, reports the links found in its anchors and how many
/// times each hostname appears. Run as a one-off command or as an HTTP API.
#[derive(Parser, Debug)]
#[command(name = "link-ripper")]
#[command(version)]
#[command(about = "Extract every link from a web page", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rip a single page and print the result as JSON
    Rip {
        /// Absolute URL of the page to rip
        url: String,

        /// Indent the JSON output
        #[arg(long, conflicts_with = "summary")]
        pretty: bool,

        /// Print human-readable statistics instead of JSON
        #[arg(long)]
        summary: bool,
    },

    /// Serve the rip API and the static UI
    Serve {
        /// Port to listen on (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_deref())?;
    apply_env_overrides(&mut config).context("Invalid environment override")?;

    match cli.command {
        Command::Rip {
            url,
            pretty,
            summary,
        } => handle_rip(&config, &url, pretty, summary).await,
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            handle_serve(&config).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_ripper=info,warn"),
            1 => EnvFilter::new("link_ripper=debug,info"),
            2 => EnvFilter::new("link_ripper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file if one was given, defaults otherwise
fn load_configuration(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles the rip command: one page, result on stdout
async fn handle_rip(config: &Config, url: &str, pretty: bool, summary: bool) -> anyhow::Result<()> {
    let target = parse_target(url).with_context(|| format!("Cannot rip {:?}", url))?;

    let ripper = Ripper::new(&config.fetcher).context("Failed to build HTTP client")?;
    let report = ripper.rip(target).await;

    if let RipOutcome::FetchFailed { reason } = &report.outcome {
        tracing::warn!("No links found, fetch failed: {}", reason);
    }

    if summary {
        let stats = RipStatistics::from_result(&report.result);
        print!("{}", format_statistics(report.target.as_str(), &stats));
    } else {
        println!("{}", render_json(&report.result, pretty)?);
    }

    Ok(())
}

/// Handles the serve command
async fn handle_serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Serving static files from {}, counting rips in {}",
        config.server.static_dir,
        config.server.count_file
    );

    link_ripper::server::serve(config)
        .await
        .context("Server failed")
}
