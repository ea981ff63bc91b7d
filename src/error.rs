//! Error types for data-source provisioning.
//!
//! All errors are defined with `thiserror`. Variants that come from the pool
//! or the network carry a suggestion so the CLI can print something actionable.

use crate::models::Vendor;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Configuration missing: a template was written to {}, fill it in and retry", path.display())]
    ConfigurationMissing { path: PathBuf },

    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Failed to initialize {vendor} pool: {message}")]
    PoolInitialization { vendor: Vendor, message: String },

    #[error("Could not acquire connection: {message}")]
    ConnectionAcquisition { message: String, suggestion: String },

    #[error("{vendor} liveness check failed: {message}")]
    LivenessCheck { vendor: Vendor, message: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42P01" for undefined table
        sql_state: Option<String>,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a configuration-missing error for the template at `path`.
    pub fn configuration_missing(path: impl Into<PathBuf>) -> Self {
        Self::ConfigurationMissing { path: path.into() }
    }

    /// Create an invalid configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a pool initialization error.
    pub fn pool_initialization(vendor: Vendor, message: impl Into<String>) -> Self {
        Self::PoolInitialization {
            vendor,
            message: message.into(),
        }
    }

    /// Create a connection acquisition error with a helpful suggestion.
    pub fn connection_acquisition(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::ConnectionAcquisition {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a liveness check error.
    pub fn liveness_check(vendor: Vendor, message: impl Into<String>) -> Self {
        Self::LivenessCheck {
            vendor,
            message: message.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(message: impl Into<String>, sql_state: Option<String>) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::ConnectionAcquisition { suggestion, .. } => Some(suggestion),
            Self::ConfigurationMissing { .. } => {
                Some("Edit the generated config file with real credentials")
            }
            Self::LivenessCheck { .. } => {
                Some("Check that the database server is running and accessible")
            }
            _ => None,
        }
    }
}

/// Convert sqlx errors raised while borrowing or using a connection.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut => DbError::connection_acquisition(
                "Timed out waiting for a pooled connection",
                "Raise maxConnections or check that the server accepts connections",
            ),
            sqlx::Error::PoolClosed => DbError::connection_acquisition(
                "Connection pool is closed",
                "The data source was shut down; open a new one",
            ),
            sqlx::Error::Io(io_err) => DbError::connection_acquisition(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection_acquisition(
                format!("TLS error: {}", tls_err),
                "Verify TLS configuration and certificates",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection_acquisition(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::Configuration(msg) => DbError::configuration(msg.to_string()),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(db_err.message(), code)
            }
            sqlx::Error::RowNotFound => DbError::database("No rows returned", None),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::database(format!("Column not found: {}", col), None)
            }
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for provisioning and sample operations.
pub type DbResult<T> = Result<T, DbError>;
