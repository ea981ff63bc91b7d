//! Sample workloads run against a provisioned data source.
//!
//! - `messages`: CRUD walkthrough on the `some_table` fixture
//! - `benchmark`: parallel and sequential insert benchmark

pub mod benchmark;
pub mod messages;

pub use benchmark::{BenchmarkMode, BenchmarkPlan, BenchmarkReport, run_benchmark};
pub use messages::{
    clear_table, find_message, insert_message, list_messages, prepare_table, run_walkthrough,
};
