//! Data models for data-source provisioning.
//!
//! This module re-exports all model types used throughout the crate.

pub mod message;
pub mod settings;
pub mod vendor;

// Re-export commonly used types
pub use message::{MESSAGE_TABLE, Message};
pub use settings::{
    ConnectionSettings, DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS, MAX_CONNECT_TIMEOUT,
    MIN_CONNECT_TIMEOUT,
};
pub use vendor::Vendor;
