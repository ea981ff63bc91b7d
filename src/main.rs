//! Datasource Samples - Main entry point.
//!
//! Opens pooled data sources for the configured backends and runs one of the
//! sample commands against them.

use clap::Parser;
use datasource_samples::config::{Command, Config, DbConfig};
use datasource_samples::db::{Backend, DataSource, MariaDb, PostgreSql};
use datasource_samples::error::{DbError, DbResult};
use datasource_samples::models::{ConnectionSettings, Vendor};
use datasource_samples::samples::{BenchmarkPlan, run_benchmark, run_walkthrough};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init();
    }
}

/// Run `command` against one backend, shutting its data source down afterwards.
async fn run_command<B: Backend>(settings: &ConnectionSettings, command: &Command) -> DbResult<()> {
    match command {
        Command::Check { strict } => {
            let provisioned = DataSource::<B>::open(settings.clone()).await?;
            let source = if *strict {
                provisioned.require_ready().await?
            } else {
                provisioned.into_source()
            };
            source.shutdown().await;
            Ok(())
        }
        Command::Sample => {
            let source = DataSource::<B>::open(settings.clone()).await?.into_source();
            let result = run_walkthrough(&source.db_pool()).await;
            source.shutdown().await;
            result.map(|rows| info!(vendor = %B::VENDOR, rows = rows.len(), "Walkthrough finished"))
        }
        Command::Bench {
            calls,
            payload_len,
            mode,
            single_connection,
        } => {
            let settings = if *single_connection {
                settings.clone().with_max_connections(1)
            } else {
                settings.clone()
            };
            let source = DataSource::<B>::open(settings).await?.into_source();
            let plan = BenchmarkPlan {
                calls: *calls,
                payload_len: *payload_len,
                mode: *mode,
            };
            let result = run_benchmark(&source.db_pool(), &plan).await;
            source.shutdown().await;
            result.map(|report| {
                if report.failed > 0 {
                    warn!(
                        vendor = %B::VENDOR,
                        failed = report.failed,
                        "Some inserts failed"
                    );
                }
            })
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    // Initialize logging
    init_tracing(&config);

    info!(
        config = %config.config.display(),
        "Starting datasource samples v{}",
        env!("CARGO_PKG_VERSION")
    );

    let db_config = match DbConfig::load_or_bootstrap(&config.config) {
        Ok(db_config) => db_config,
        Err(e @ DbError::ConfigurationMissing { .. }) => {
            eprintln!("Error: {}", e);
            eprintln!();
            eprintln!("Fill in the 'postgres' and 'mariadb' sections, then run again:");
            eprintln!("  datasource-samples --config {} check", config.config.display());
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let mut failures = 0;
    for vendor in config.backend.vendors() {
        let settings = db_config.settings(vendor);
        let result = match vendor {
            Vendor::MariaDb => run_command::<MariaDb>(settings, &config.command).await,
            Vendor::PostgreSql => run_command::<PostgreSql>(settings, &config.command).await,
        };

        if let Err(e) = result {
            failures += 1;
            match e.suggestion() {
                Some(suggestion) => error!(%vendor, error = %e, suggestion, "Command failed"),
                None => error!(%vendor, error = %e, "Command failed"),
            }
        }
    }

    if failures > 0 {
        return Err(format!("{} backend(s) failed", failures).into());
    }

    info!("Done");
    Ok(())
}
