//! Configuration handling.
//!
//! Two layers:
//! - [`DbConfig`]: the JSON file holding one [`ConnectionSettings`] per vendor
//! - [`Config`]: CLI arguments and environment variables for the binary

use crate::error::{DbError, DbResult};
use crate::models::{ConnectionSettings, Vendor};
use crate::samples::BenchmarkMode;
use crate::samples::benchmark::{DEFAULT_BENCHMARK_CALLS, DEFAULT_PAYLOAD_LEN};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.json";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of the settings file: one section per vendor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DbConfig {
    pub postgres: ConnectionSettings,
    pub mariadb: ConnectionSettings,
}

impl DbConfig {
    /// The file written when no configuration exists yet.
    pub fn template() -> Self {
        Self {
            postgres: ConnectionSettings::template(Vendor::PostgreSql),
            mariadb: ConnectionSettings::template(Vendor::MariaDb),
        }
    }

    /// Settings for `vendor`.
    pub fn settings(&self, vendor: Vendor) -> &ConnectionSettings {
        match vendor {
            Vendor::MariaDb => &self.mariadb,
            Vendor::PostgreSql => &self.postgres,
        }
    }

    /// Parse a settings file.
    pub fn load(path: &Path) -> DbResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DbError::configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
            .map_err(|e| DbError::configuration(format!("{}: {}", path.display(), e)))
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load `path`, or write a template there and report that it needs filling in.
    pub fn load_or_bootstrap(path: &Path) -> DbResult<Self> {
        if path.exists() {
            return Self::load(path);
        }

        warn!(path = %path.display(), "Config file not found, writing template");
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                DbError::configuration(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }
        let template = serde_json::to_string_pretty(&Self::template())
            .map_err(|e| DbError::internal(format!("cannot serialize template: {}", e)))?;
        fs::write(path, template).map_err(|e| {
            DbError::configuration(format!("cannot write {}: {}", path.display(), e))
        })?;
        info!(path = %path.display(), "Template written");

        Err(DbError::configuration_missing(path))
    }
}

/// Which backends a command runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BackendSelection {
    #[default]
    All,
    Mariadb,
    Postgres,
}

impl BackendSelection {
    pub fn vendors(&self) -> Vec<Vendor> {
        match self {
            Self::All => Vendor::ALL.to_vec(),
            Self::Mariadb => vec![Vendor::MariaDb],
            Self::Postgres => vec![Vendor::PostgreSql],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Open each data source, run the liveness check and shut it down
    Check {
        /// Fail when a pool cannot be verified
        #[arg(long)]
        strict: bool,
    },
    /// Run the CRUD walkthrough on the demo table
    Sample,
    /// Run the insert benchmark
    Bench {
        /// Number of inserts
        #[arg(long, default_value_t = DEFAULT_BENCHMARK_CALLS)]
        calls: usize,

        /// Length of each random message
        #[arg(long, default_value_t = DEFAULT_PAYLOAD_LEN)]
        payload_len: usize,

        #[arg(long, value_enum, default_value = "parallel")]
        mode: BenchmarkMode,

        /// Limit the pool to a single connection
        #[arg(long)]
        single_connection: bool,
    },
}

/// Command-line configuration for the binary.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "datasource-samples",
    about = "Provision pooled data sources for PostgreSQL and MariaDB and run sample workloads",
    version,
    author
)]
pub struct Config {
    /// Path to the JSON settings file (a template is written if missing)
    #[arg(
        short,
        long,
        value_name = "PATH",
        default_value = DEFAULT_CONFIG_PATH,
        env = "DATASOURCE_CONFIG"
    )]
    pub config: PathBuf,

    /// Backends to run against
    #[arg(
        short,
        long,
        value_enum,
        default_value = "all",
        env = "DATASOURCE_BACKEND"
    )]
    pub backend: BackendSelection,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = DEFAULT_LOG_LEVEL, env = "DATASOURCE_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "DATASOURCE_JSON_LOGS")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}
