//! Driver-erased connection pool.
//!
//! [`DataSource`](super::DataSource) keeps the pool fully typed and owns its
//! shutdown. The samples only need to know which driver they are talking to,
//! so they work on this enum and branch with
//! [`impl_db_dispatch!`](crate::impl_db_dispatch).

use crate::models::Vendor;
use sqlx::{MySqlPool, PgPool};

/// Database-specific connection pool (avoids AnyPool limitations).
#[derive(Debug, Clone)]
pub enum DbPool {
    MySql(MySqlPool),
    Postgres(PgPool),
}

impl DbPool {
    /// Get the vendor this pool talks to.
    pub fn vendor(&self) -> Vendor {
        match self {
            DbPool::MySql(_) => Vendor::MariaDb,
            DbPool::Postgres(_) => Vendor::PostgreSql,
        }
    }
}
