//! Supported database vendors.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// MariaDB waits up to five minutes for a connection to be established.
pub const MARIADB_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5 * 60);
pub const POSTGRES_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Database vendors a data source can be provisioned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vendor {
    /// Spoken over the MySQL wire protocol.
    MariaDb,
    PostgreSql,
}

impl Vendor {
    pub const ALL: [Vendor; 2] = [Vendor::MariaDb, Vendor::PostgreSql];

    /// Identifier of the driver that backs pools for this vendor.
    pub fn driver_id(&self) -> &'static str {
        match self {
            Self::MariaDb => "sqlx-mysql",
            Self::PostgreSql => "sqlx-postgres",
        }
    }

    /// Scheme token used when formatting connection URLs.
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::MariaDb => "mysql",
            Self::PostgreSql => "postgresql",
        }
    }

    /// Get the display name for this vendor.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MariaDb => "MariaDB",
            Self::PostgreSql => "PostgreSQL",
        }
    }

    /// Get the default port for this vendor.
    pub fn default_port(&self) -> u16 {
        match self {
            Self::MariaDb => 3306,
            Self::PostgreSql => 5432,
        }
    }

    /// How long a pool waits to hand out a connection before giving up.
    pub fn acquire_timeout(&self) -> Duration {
        match self {
            Self::MariaDb => MARIADB_ACQUIRE_TIMEOUT,
            Self::PostgreSql => POSTGRES_ACQUIRE_TIMEOUT,
        }
    }

    /// Bind parameter placeholder for the 1-based parameter `index`.
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            Self::MariaDb => "?".to_string(),
            Self::PostgreSql => format!("${}", index),
        }
    }
}

impl std::fmt::Display for Vendor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schemes() {
        assert_eq!(Vendor::MariaDb.scheme(), "mysql");
        assert_eq!(Vendor::PostgreSql.scheme(), "postgresql");
    }

    #[test]
    fn test_mariadb_waits_longer_than_postgres() {
        assert!(Vendor::MariaDb.acquire_timeout() > Vendor::PostgreSql.acquire_timeout());
        assert_eq!(Vendor::MariaDb.acquire_timeout(), Duration::from_secs(300));
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Vendor::MariaDb.placeholder(2), "?");
        assert_eq!(Vendor::PostgreSql.placeholder(2), "$2");
    }

    #[test]
    fn test_serde_lowercase() {
        let v: Vendor = serde_json::from_str("\"postgresql\"").unwrap();
        assert_eq!(v, Vendor::PostgreSql);
        assert_eq!(serde_json::to_string(&Vendor::MariaDb).unwrap(), "\"mariadb\"");
    }
}
