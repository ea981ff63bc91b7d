//! Datasource Samples Library
//!
//! Provisions pooled data sources for PostgreSQL and MariaDB: settings are
//! mapped onto a vendor backend, the pool is built and verified once, then
//! lent out until shutdown. Sample CRUD and benchmark workloads run on top.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod samples;

pub use config::{Config, DbConfig};
pub use db::{Backend, DataSource, MariaDb, PostgreSql, Provisioned};
pub use error::{DbError, DbResult};
pub use models::{ConnectionSettings, Vendor};
