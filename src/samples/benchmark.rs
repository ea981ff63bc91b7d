//! Insert benchmark against a provisioned pool.
//!
//! Each insert borrows one connection and gives it back. Run it against a
//! source opened with `settings.with_max_connections(1)` to measure a
//! single-connection pool.

use crate::db::DbPool;
use crate::error::{DbError, DbResult};
use crate::samples::messages::{clear_table, insert_message, prepare_table};
use clap::ValueEnum;
use futures_util::StreamExt;
use futures_util::stream;
use rand::Rng;
use rand::distributions::Alphanumeric;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const DEFAULT_BENCHMARK_CALLS: usize = 50_000;
pub const DEFAULT_PAYLOAD_LEN: usize = 5_000;

/// How inserts are issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BenchmarkMode {
    /// All inserts in flight at once, bounded only by the pool
    #[default]
    Parallel,
    /// One insert after another
    Sequential,
}

impl std::fmt::Display for BenchmarkMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parallel => write!(f, "Parallel"),
            Self::Sequential => write!(f, "Non Parallel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkPlan {
    pub calls: usize,
    pub payload_len: usize,
    pub mode: BenchmarkMode,
}

impl Default for BenchmarkPlan {
    fn default() -> Self {
        Self {
            calls: DEFAULT_BENCHMARK_CALLS,
            payload_len: DEFAULT_PAYLOAD_LEN,
            mode: BenchmarkMode::default(),
        }
    }
}

impl BenchmarkPlan {
    /// Row ids are `0..calls` and must fit the INTEGER column.
    pub fn validate(&self) -> DbResult<()> {
        if self.payload_len == 0 {
            return Err(DbError::configuration("payload length must be at least 1"));
        }
        if i32::try_from(self.calls).is_err() {
            return Err(DbError::configuration(format!(
                "calls ({}) exceeds the largest row id {}",
                self.calls,
                i32::MAX
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkReport {
    pub mode: BenchmarkMode,
    pub calls: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

/// Generate `amount` random alphanumeric strings of `len` characters.
pub fn random_payloads(amount: usize, len: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..amount)
        .map(|_| {
            (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(len)
                .map(char::from)
                .collect()
        })
        .collect()
}

/// Run `plan` against `pool`.
///
/// The fixture table is created first and dropped afterwards. Failed inserts
/// are logged and counted; the run carries on without retrying them.
pub async fn run_benchmark(pool: &DbPool, plan: &BenchmarkPlan) -> DbResult<BenchmarkReport> {
    plan.validate()?;
    let vendor = pool.vendor();

    prepare_table(pool).await?;
    let payloads = random_payloads(plan.calls, plan.payload_len);
    let failed = AtomicUsize::new(0);

    let started = Instant::now();
    match plan.mode {
        BenchmarkMode::Sequential => {
            for (id, payload) in payloads.iter().enumerate() {
                if let Err(e) = insert_message(pool, id as i32, payload).await {
                    warn!(%vendor, id, error = %e, "Could not insert data");
                    failed.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
        BenchmarkMode::Parallel => {
            stream::iter(payloads.iter().enumerate())
                .for_each_concurrent(None, |(id, payload)| {
                    let failed = &failed;
                    async move {
                        if let Err(e) = insert_message(pool, id as i32, payload).await {
                            warn!(%vendor, id, error = %e, "Could not insert data");
                            failed.fetch_add(1, Ordering::Relaxed);
                        }
                    }
                })
                .await;
        }
    }
    let elapsed = started.elapsed();

    clear_table(pool).await?;

    let failed = failed.into_inner();
    let report = BenchmarkReport {
        mode: plan.mode,
        calls: plan.calls,
        succeeded: plan.calls - failed,
        failed,
        elapsed,
    };
    info!(
        %vendor,
        failed = report.failed,
        "{} {} Requests took {} ms | {} seconds",
        report.calls,
        report.mode,
        report.elapsed.as_millis(),
        report.elapsed.as_secs()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_payloads_shape() {
        let payloads = random_payloads(20, 64);
        assert_eq!(payloads.len(), 20);
        assert!(payloads.iter().all(|p| p.len() == 64));
        assert!(
            payloads
                .iter()
                .all(|p| p.chars().all(|c| c.is_ascii_alphanumeric()))
        );
    }

    #[test]
    fn test_default_plan_matches_reference_workload() {
        let plan = BenchmarkPlan::default();
        assert_eq!(plan.calls, 50_000);
        assert_eq!(plan.payload_len, 5_000);
        assert_eq!(plan.mode, BenchmarkMode::Parallel);
        assert!(plan.validate().is_ok());
    }

    #[test]
    fn test_plan_rejects_empty_payload() {
        let plan = BenchmarkPlan {
            payload_len: 0,
            ..BenchmarkPlan::default()
        };
        assert!(matches!(
            plan.validate(),
            Err(DbError::Configuration { .. })
        ));
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(BenchmarkMode::Parallel.to_string(), "Parallel");
        assert_eq!(BenchmarkMode::Sequential.to_string(), "Non Parallel");
    }
}
