use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};

use sheet_bootstrap::app::ports::KnownRoutes;
use sheet_bootstrap::config::Config;
use sheet_bootstrap::constants::DEFAULT_CONFIG_PATH;
use sheet_bootstrap::infra::transport_from_config;
use sheet_bootstrap::{logging, metrics, Bootstrapper};

#[derive(Parser)]
#[command(name = "sheet_bootstrap")]
#[command(about = "Bootstrap the application model from published spreadsheets")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the startup configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Expose Prometheus metrics while running
    #[arg(long)]
    metrics: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the data and config sheet locators
    Resolve,
    /// Resolve sources and load the serializer field mappings
    Mappings,
    /// Run the full bootstrap and print the assembled model
    Bootstrap {
        /// Routes the shell can render (comma-separated); defaults to routes.known
        #[arg(long)]
        routes: Option<String>,
    },
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

/// Bound one command by `deadline`; running out surfaces as "<what> timed out".
async fn with_deadline<T, F>(deadline: Duration, what: &str, run: F) -> Result<T>
where
    F: Future<Output = sheet_bootstrap::Result<T>>,
{
    let outcome = tokio::time::timeout(deadline, run)
        .await
        .with_context(|| format!("{} timed out", what))?;
    Ok(outcome?)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    if cli.metrics {
        metrics::init_metrics();
    }

    let config = Config::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let transport = transport_from_config(&config.transport)?;
    info!(transport = transport.name(), "Using {} transport", transport.name());

    let bootstrapper = Bootstrapper::new(transport);
    // The core has no timeout of its own; the whole run is bounded here
    let deadline = Duration::from_secs(config.transport.bootstrap_timeout_seconds);

    match cli.command {
        Commands::Resolve => {
            let resolved = with_deadline(
                deadline,
                "source resolution",
                bootstrapper.resolve_sources(&config.sources),
            )
            .await?;
            print_json(&resolved, cli.pretty)?;
        }
        Commands::Mappings => {
            let (_, mappings) = with_deadline(
                deadline,
                "loading field mappings",
                bootstrapper.load_mappings(&config.sources),
            )
            .await?;
            print_json(&mappings, cli.pretty)?;
        }
        Commands::Bootstrap { routes } => {
            let routes = match routes {
                Some(list) => KnownRoutes::new(
                    list.split(',')
                        .map(str::trim)
                        .filter(|route| !route.is_empty()),
                ),
                None => KnownRoutes::new(config.routes.known.iter().cloned()),
            };

            let run = with_deadline(
                deadline,
                "bootstrap",
                bootstrapper.bootstrap_and_assemble(&config.sources, &routes),
            )
            .await;

            match run {
                Ok(bootstrap) => {
                    info!(
                        "Model ready after {} ms",
                        bootstrap.duration().num_milliseconds()
                    );
                    print_json(&bootstrap.model, cli.pretty)?;
                }
                Err(e) => {
                    error!("Bootstrap failed: {:#}", e);
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}
