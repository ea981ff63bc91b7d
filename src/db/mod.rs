//! Database abstraction layer.
//!
//! This module provides:
//! - Vendor backends that map settings onto sqlx pool configuration
//! - The shared data-source lifecycle (open, verify, acquire, shutdown)
//! - A driver-erased pool and dispatch macro for vendor-specific queries

pub mod backend;
#[macro_use]
pub mod macros;
pub mod pool;
pub mod source;

pub use backend::{Backend, MariaDb, PostgreSql};
pub use pool::DbPool;
pub use source::{
    DataSource, LIVENESS_CHECK_TIMEOUT, MariaDbSource, PostgreSqlSource, Provisioned,
};
