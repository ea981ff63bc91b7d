//! End-to-end tests against real databases.
//!
//! Set `DATASOURCE_TEST_CONFIG` to a settings file (same layout as
//! `config/config.json`) pointing at reachable PostgreSQL and MariaDB
//! servers. Without it every test here returns early.

use datasource_samples::DbConfig;
use datasource_samples::db::{MariaDbSource, PostgreSqlSource};
use datasource_samples::models::Message;
use datasource_samples::samples::{
    BenchmarkMode, BenchmarkPlan, clear_table, find_message, insert_message, list_messages,
    prepare_table, run_benchmark, run_walkthrough,
};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Tests sharing the fixture table must not run concurrently.
static TABLE_LOCK: Mutex<()> = Mutex::const_new(());

fn live_config() -> Option<DbConfig> {
    let path = std::env::var_os("DATASOURCE_TEST_CONFIG").map(PathBuf::from)?;
    Some(DbConfig::load(&path).expect("DATASOURCE_TEST_CONFIG must point at a valid config"))
}

#[tokio::test]
async fn test_postgres_end_to_end() {
    let Some(config) = live_config() else { return };

    let source = PostgreSqlSource::open(config.postgres.clone())
        .await
        .unwrap()
        .require_ready()
        .await
        .unwrap();

    let mut conn = source.acquire().await.unwrap();
    sqlx::query("SELECT 1").execute(&mut *conn).await.unwrap();
    drop(conn);

    sqlx::query("SELECT 1").execute(source.pool()).await.unwrap();

    source.shutdown().await;
    assert!(source.is_closed());
}

#[tokio::test]
async fn test_mariadb_end_to_end() {
    let Some(config) = live_config() else { return };

    let source = MariaDbSource::open(config.mariadb.clone())
        .await
        .unwrap()
        .require_ready()
        .await
        .unwrap();

    let mut conn = source.acquire().await.unwrap();
    sqlx::query("SELECT 1").execute(&mut *conn).await.unwrap();
    drop(conn);

    source.shutdown().await;
    assert!(source.is_closed());
}

#[tokio::test]
async fn test_walkthrough_on_both_backends() {
    let Some(config) = live_config() else { return };
    let _guard = TABLE_LOCK.lock().await;

    let expected = vec![
        Message::new(10, "some message"),
        Message::new(11, "some other message"),
    ];

    let pg = PostgreSqlSource::open(config.postgres.clone())
        .await
        .unwrap()
        .require_ready()
        .await
        .unwrap();
    let rows = run_walkthrough(&pg.db_pool()).await.unwrap();
    assert_eq!(rows, expected);
    pg.shutdown().await;

    let maria = MariaDbSource::open(config.mariadb.clone())
        .await
        .unwrap()
        .require_ready()
        .await
        .unwrap();
    let rows = run_walkthrough(&maria.db_pool()).await.unwrap();
    assert_eq!(rows, expected);
    maria.shutdown().await;
}

#[tokio::test]
async fn test_find_missing_message_returns_none() {
    let Some(config) = live_config() else { return };
    let _guard = TABLE_LOCK.lock().await;

    let source = PostgreSqlSource::open(config.postgres.clone())
        .await
        .unwrap()
        .into_source();
    let pool = source.db_pool();

    prepare_table(&pool).await.unwrap();
    insert_message(&pool, 1, "only row").await.unwrap();
    assert_eq!(find_message(&pool, 2).await.unwrap(), None);
    assert_eq!(list_messages(&pool).await.unwrap().len(), 1);
    clear_table(&pool).await.unwrap();

    source.shutdown().await;
}

#[tokio::test]
async fn test_benchmark_modes_with_single_connection() {
    let Some(config) = live_config() else { return };
    let _guard = TABLE_LOCK.lock().await;

    let source = MariaDbSource::open(config.mariadb.clone().with_max_connections(1))
        .await
        .unwrap()
        .require_ready()
        .await
        .unwrap();
    let pool = source.db_pool();

    for mode in [BenchmarkMode::Parallel, BenchmarkMode::Sequential] {
        let plan = BenchmarkPlan {
            calls: 200,
            payload_len: 64,
            mode,
        };
        let report = run_benchmark(&pool, &plan).await.unwrap();
        assert_eq!(report.calls, 200);
        assert_eq!(report.succeeded + report.failed, 200);
        assert_eq!(report.failed, 0);
    }

    source.shutdown().await;
}
