//! Connection settings for one database endpoint.

use crate::models::Vendor;
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_MAX_CONNECTIONS: i32 = 10;

/// Bounds applied to `connectTimeoutSecs`, whatever the file says.
pub const MIN_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);
pub const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Settings for a single database endpoint, as read from the config file.
///
/// The value is immutable: variants are derived with the `with_*` methods,
/// which leave the original untouched. Nothing here is validated; malformed
/// values only surface when a pool is built or connects.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionSettings {
    address: String,
    #[serde(deserialize_with = "port_from_string_or_number")]
    port: String,
    database: String,
    user: String,
    /// Contains sensitive data - never log
    password: String,
    #[serde(default = "default_min_connections")]
    min_connections: u32,
    #[serde(default = "default_max_connections")]
    max_connections: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    connect_timeout_secs: Option<u64>,
}

fn default_min_connections() -> u32 {
    DEFAULT_MIN_CONNECTIONS
}

fn default_max_connections() -> i32 {
    DEFAULT_MAX_CONNECTIONS
}

/// Ports are strings in the file format, but hand-edited files often use numbers.
fn port_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Port {
        Text(String),
        Number(u64),
    }

    Ok(match Port::deserialize(deserializer)? {
        Port::Text(s) => s,
        Port::Number(n) => n.to_string(),
    })
}

impl ConnectionSettings {
    /// Create settings with the default pool bounds (min 1, max 10).
    pub fn new(
        address: impl Into<String>,
        port: impl Into<String>,
        database: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            port: port.into(),
            database: database.into(),
            user: user.into(),
            password: password.into(),
            min_connections: DEFAULT_MIN_CONNECTIONS,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout_secs: None,
        }
    }

    /// Template settings pointing at a local server with the vendor's default port.
    pub fn template(vendor: Vendor) -> Self {
        Self::new(
            "localhost",
            vendor.default_port().to_string(),
            "database",
            "user",
            "password",
        )
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn min_connections(&self) -> u32 {
        self.min_connections
    }

    /// The stored maximum, exactly as configured (may be zero or negative).
    pub fn max_connections(&self) -> i32 {
        self.max_connections
    }

    /// Maximum pool size, never less than 1.
    pub fn max_pool_size(&self) -> u32 {
        self.max_connections.max(1) as u32
    }

    /// Explicit connection-establishment timeout, overriding the vendor default.
    ///
    /// Clamped to `MIN_CONNECT_TIMEOUT..=MAX_CONNECT_TIMEOUT`.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(|secs| {
            Duration::from_secs(secs).clamp(MIN_CONNECT_TIMEOUT, MAX_CONNECT_TIMEOUT)
        })
    }

    /// Format `<scheme>://<address>:<port>/<database>` for `vendor`.
    pub fn url_for(&self, vendor: Vendor) -> String {
        format!(
            "{}://{}:{}/{}",
            vendor.scheme(),
            self.address,
            self.port,
            self.database
        )
    }

    pub fn with_max_connections(self, max_connections: i32) -> Self {
        Self {
            max_connections,
            ..self
        }
    }

    pub fn with_min_connections(self, min_connections: u32) -> Self {
        Self {
            min_connections,
            ..self
        }
    }

    pub fn with_connect_timeout(self, timeout: Duration) -> Self {
        Self {
            connect_timeout_secs: Some(timeout.as_secs()),
            ..self
        }
    }
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("address", &self.address)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"****")
            .field("min_connections", &self.min_connections)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}
