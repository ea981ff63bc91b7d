//! Pooled data-source lifecycle.
//!
//! A [`DataSource`] is opened from [`ConnectionSettings`], verified once,
//! lent out through [`DataSource::acquire`] and finally shut down. The
//! vendor-specific part is the [`Backend`] type parameter.
//!
//! ```ignore
//! let source = DataSource::<PostgreSql>::open(settings).await?.require_ready().await?;
//! let mut conn = source.acquire().await?;
//! sqlx::query("SELECT 1").execute(&mut *conn).await?;
//! drop(conn);
//! source.shutdown().await;
//! ```

use crate::db::backend::{Backend, MariaDb, PostgreSql};
use crate::db::pool::DbPool;
use crate::error::{DbError, DbResult};
use crate::models::{ConnectionSettings, Vendor};
use sqlx::pool::PoolConnection;
use sqlx::{Connection, Pool};
use std::fmt;
use std::marker::PhantomData;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Upper bound for the one-time liveness check run by [`DataSource::open`].
pub const LIVENESS_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

pub type MariaDbSource = DataSource<MariaDb>;
pub type PostgreSqlSource = DataSource<PostgreSql>;

/// A live connection pool together with the settings it was built from.
///
/// The pool is owned exclusively by this value. Cloning the pool out through
/// [`DataSource::db_pool`] shares it, it does not create a second one.
pub struct DataSource<B: Backend> {
    pool: Pool<B::Database>,
    settings: ConnectionSettings,
    _backend: PhantomData<B>,
}

/// Outcome of [`DataSource::open`].
///
/// A failed liveness check does not fail `open`; the caller gets the source
/// either way and decides what an unverified pool means.
pub enum Provisioned<B: Backend> {
    /// The liveness check succeeded.
    Ready(DataSource<B>),
    /// The pool was built but could not produce a working connection.
    ReadyUnverified {
        source: DataSource<B>,
        reason: String,
    },
}

impl<B: Backend> Provisioned<B> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Provisioned::Ready(_))
    }

    /// Failure message of the liveness check, if it failed.
    pub fn unverified_reason(&self) -> Option<&str> {
        match self {
            Provisioned::Ready(_) => None,
            Provisioned::ReadyUnverified { reason, .. } => Some(reason),
        }
    }

    pub fn source(&self) -> &DataSource<B> {
        match self {
            Provisioned::Ready(source) => source,
            Provisioned::ReadyUnverified { source, .. } => source,
        }
    }

    /// Take the source regardless of the liveness check.
    pub fn into_source(self) -> DataSource<B> {
        match self {
            Provisioned::Ready(source) => source,
            Provisioned::ReadyUnverified { source, .. } => source,
        }
    }

    /// Treat an unverified pool as fatal. The pool is closed before the error returns.
    pub async fn require_ready(self) -> DbResult<DataSource<B>> {
        match self {
            Provisioned::Ready(source) => Ok(source),
            Provisioned::ReadyUnverified { source, reason } => {
                source.shutdown().await;
                Err(DbError::liveness_check(B::VENDOR, reason))
            }
        }
    }
}

impl<B: Backend> fmt::Debug for Provisioned<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provisioned::Ready(source) => f.debug_tuple("Ready").field(source).finish(),
            Provisioned::ReadyUnverified { source, reason } => f
                .debug_struct("ReadyUnverified")
                .field("source", source)
                .field("reason", reason)
                .finish(),
        }
    }
}

impl<B: Backend> DataSource<B> {
    /// Build the pool for `settings` and run the liveness check.
    ///
    /// Fails only when the pool cannot be built (for example a non-numeric
    /// port). An unreachable server yields [`Provisioned::ReadyUnverified`].
    pub async fn open(settings: ConnectionSettings) -> DbResult<Provisioned<B>> {
        info!(
            vendor = %B::VENDOR,
            url = %settings.url_for(B::VENDOR),
            max_pool_size = settings.max_pool_size(),
            "Opening data source"
        );

        let pool = B::build_pool(&settings)?;
        let source = Self {
            pool,
            settings,
            _backend: PhantomData,
        };

        let started = Instant::now();
        match source.check_liveness(LIVENESS_CHECK_TIMEOUT).await {
            Ok(()) => {
                info!(
                    vendor = %B::VENDOR,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Data source successfully connected"
                );
                Ok(Provisioned::Ready(source))
            }
            Err(reason) => {
                warn!(
                    vendor = %B::VENDOR,
                    error = %reason,
                    "Data source connection failed"
                );
                Ok(Provisioned::ReadyUnverified { source, reason })
            }
        }
    }

    /// Acquire a connection, ping it and give it back, all within `timeout`.
    async fn check_liveness(&self, timeout: Duration) -> Result<(), String> {
        let check = async {
            let mut conn = self.pool.acquire().await?;
            conn.ping().await?;
            Ok::<_, sqlx::Error>(())
        };

        match tokio::time::timeout(timeout, check).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "no working connection within {}s",
                timeout.as_secs()
            )),
        }
    }

    /// Borrow a connection from the pool. Dropping it returns it to the pool.
    pub async fn acquire(&self) -> DbResult<PoolConnection<B::Database>> {
        self.pool.acquire().await.map_err(|e| {
            debug!(vendor = %B::VENDOR, error = %e, "Connection acquisition failed");
            match DbError::from(e) {
                err @ DbError::ConnectionAcquisition { .. } => err,
                other => DbError::connection_acquisition(
                    other.to_string(),
                    "Check the connection settings and database server status",
                ),
            }
        })
    }

    /// Close the pool, waiting for leased connections to come back.
    ///
    /// Later calls are no-ops and later [`acquire`](Self::acquire) calls fail
    /// immediately with a closed-pool error.
    pub async fn shutdown(&self) {
        if self.pool.is_closed() {
            debug!(vendor = %B::VENDOR, "Data source already shut down");
            return;
        }
        info!(
            vendor = %B::VENDOR,
            size = self.pool.size(),
            idle = self.pool.num_idle(),
            "Shutting down data source"
        );
        self.pool.close().await;
        info!(vendor = %B::VENDOR, "Data source closed");
    }

    pub fn settings(&self) -> &ConnectionSettings {
        &self.settings
    }

    pub fn vendor(&self) -> Vendor {
        B::VENDOR
    }

    pub fn is_closed(&self) -> bool {
        self.pool.is_closed()
    }

    /// Connections currently open, idle or leased.
    pub fn size(&self) -> u32 {
        self.pool.size()
    }

    pub fn idle(&self) -> usize {
        self.pool.num_idle()
    }

    /// The typed pool, for running queries directly.
    pub fn pool(&self) -> &Pool<B::Database> {
        &self.pool
    }

    /// A driver-erased handle on the same pool.
    pub fn db_pool(&self) -> DbPool {
        B::into_db_pool(self.pool.clone())
    }
}

impl<B: Backend> fmt::Debug for DataSource<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataSource")
            .field("vendor", &B::VENDOR)
            .field("settings", &self.settings)
            .field("closed", &self.pool.is_closed())
            .finish_non_exhaustive()
    }
}
