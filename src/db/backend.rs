//! Vendor backends.
//!
//! A [`Backend`] turns [`ConnectionSettings`] into the connect options and
//! pool options of one sqlx driver. The lifecycle around the pool lives in
//! [`DataSource`](super::DataSource) and is shared by every backend.

use crate::db::pool::DbPool;
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionSettings, Vendor};
use sqlx::pool::PoolOptions;
use sqlx::{
    Connection, Database, MySql, Pool, Postgres, mysql::MySqlConnectOptions,
    postgres::PgConnectOptions,
};
use tracing::debug;

/// Connect options type of a backend's driver.
pub type ConnectOptionsOf<B> =
    <<<B as Backend>::Database as Database>::Connection as Connection>::Options;

/// Vendor-specific construction of a connection pool.
pub trait Backend: Send + Sync + 'static {
    /// The sqlx driver used for this vendor.
    type Database: Database;

    const VENDOR: Vendor;

    /// Map settings onto driver connect options.
    fn connect_options(settings: &ConnectionSettings) -> DbResult<ConnectOptionsOf<Self>>;

    /// Erase the driver type so samples can dispatch on it.
    fn into_db_pool(pool: Pool<Self::Database>) -> DbPool;

    /// Pool sizing and timeouts. Max size comes from `max_pool_size()`.
    fn pool_options(settings: &ConnectionSettings) -> PoolOptions<Self::Database> {
        let max = settings.max_pool_size();
        PoolOptions::new()
            .max_connections(max)
            .min_connections(settings.min_connections().min(max))
            .acquire_timeout(
                settings
                    .connect_timeout()
                    .unwrap_or_else(|| Self::VENDOR.acquire_timeout()),
            )
    }

    /// Build the pool without opening any connection yet.
    fn build_pool(settings: &ConnectionSettings) -> DbResult<Pool<Self::Database>> {
        let options = Self::connect_options(settings)?;
        let pool_options = Self::pool_options(settings);
        debug!(
            vendor = %Self::VENDOR,
            driver = Self::VENDOR.driver_id(),
            max_connections = pool_options.get_max_connections(),
            min_connections = pool_options.get_min_connections(),
            acquire_timeout_ms = pool_options.get_acquire_timeout().as_millis() as u64,
            "Building connection pool"
        );
        Ok(pool_options.connect_lazy_with(options))
    }
}

/// MariaDB, through the MySQL driver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MariaDb;

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgreSql;

impl Backend for MariaDb {
    type Database = MySql;

    const VENDOR: Vendor = Vendor::MariaDb;

    fn connect_options(settings: &ConnectionSettings) -> DbResult<MySqlConnectOptions> {
        Ok(MySqlConnectOptions::new()
            .host(settings.address())
            .port(parse_port(Self::VENDOR, settings)?)
            .username(settings.user())
            .password(settings.password())
            .database(settings.database())
            .charset("utf8mb4"))
    }

    fn into_db_pool(pool: Pool<MySql>) -> DbPool {
        DbPool::MySql(pool)
    }
}

impl Backend for PostgreSql {
    type Database = Postgres;

    const VENDOR: Vendor = Vendor::PostgreSql;

    fn connect_options(settings: &ConnectionSettings) -> DbResult<PgConnectOptions> {
        Ok(PgConnectOptions::new()
            .host(settings.address())
            .port(parse_port(Self::VENDOR, settings)?)
            .username(settings.user())
            .password(settings.password())
            .database(settings.database()))
    }

    fn into_db_pool(pool: Pool<Postgres>) -> DbPool {
        DbPool::Postgres(pool)
    }
}

fn parse_port(vendor: Vendor, settings: &ConnectionSettings) -> DbResult<u16> {
    settings.port().trim().parse::<u16>().map_err(|e| {
        DbError::pool_initialization(vendor, format!("invalid port '{}': {}", settings.port(), e))
    })
}
