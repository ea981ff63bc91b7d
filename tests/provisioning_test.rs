//! Integration tests for the data-source lifecycle that need no database.
//!
//! Nothing listens on 127.0.0.1:1, so connections are refused and the
//! liveness check fails once the short connect timeout runs out.

use datasource_samples::db::{LIVENESS_CHECK_TIMEOUT, MariaDbSource, PostgreSqlSource, Provisioned};
use datasource_samples::{ConnectionSettings, DbError, Vendor};
use std::time::{Duration, Instant};

fn unreachable_settings() -> ConnectionSettings {
    ConnectionSettings::new("127.0.0.1", "1", "test", "user", "password")
        .with_connect_timeout(Duration::from_secs(1))
}

#[tokio::test]
async fn test_unreachable_server_yields_unverified_source() {
    let provisioned = PostgreSqlSource::open(unreachable_settings())
        .await
        .expect("building the pool should not fail");

    assert!(!provisioned.is_ready());
    assert!(provisioned.unverified_reason().is_some());
    assert!(matches!(provisioned, Provisioned::ReadyUnverified { .. }));
    assert_eq!(provisioned.source().vendor(), Vendor::PostgreSql);

    let source = provisioned.into_source();
    assert!(!source.is_closed());
    assert_eq!(source.idle(), 0);
    source.shutdown().await;
}

#[tokio::test]
async fn test_acquire_after_shutdown_fails_fast() {
    let source = MariaDbSource::open(unreachable_settings())
        .await
        .unwrap()
        .into_source();

    source.shutdown().await;
    assert!(source.is_closed());

    let result = tokio::time::timeout(Duration::from_secs(2), source.acquire())
        .await
        .expect("acquire on a closed pool must not hang");
    match result {
        Err(DbError::ConnectionAcquisition { message, .. }) => {
            assert!(message.contains("closed"), "unexpected message: {}", message);
        }
        other => panic!("expected ConnectionAcquisition, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_shutdown_twice_is_harmless() {
    let source = PostgreSqlSource::open(unreachable_settings())
        .await
        .unwrap()
        .into_source();

    source.shutdown().await;
    source.shutdown().await;
    assert!(source.is_closed());
}

#[tokio::test]
async fn test_require_ready_rejects_unverified_pool() {
    let provisioned = MariaDbSource::open(unreachable_settings()).await.unwrap();

    let result = provisioned.require_ready().await;
    assert!(matches!(
        result,
        Err(DbError::LivenessCheck {
            vendor: Vendor::MariaDb,
            ..
        })
    ));
}

#[tokio::test]
async fn test_invalid_port_fails_open() {
    let settings = ConnectionSettings::new("localhost", "5432x", "test", "user", "password");
    let result = PostgreSqlSource::open(settings).await;
    assert!(matches!(
        result,
        Err(DbError::PoolInitialization {
            vendor: Vendor::PostgreSql,
            ..
        })
    ));
}

#[tokio::test]
async fn test_single_connection_override_is_independent() {
    let original = unreachable_settings().with_max_connections(8);
    let source = PostgreSqlSource::open(original.clone().with_max_connections(1))
        .await
        .unwrap()
        .into_source();

    assert_eq!(source.settings().max_pool_size(), 1);
    assert_eq!(original.max_pool_size(), 8);
    source.shutdown().await;
}

#[tokio::test]
async fn test_zero_max_connections_still_builds_pool() {
    let source = MariaDbSource::open(unreachable_settings().with_max_connections(0))
        .await
        .unwrap()
        .into_source();

    assert_eq!(source.settings().max_pool_size(), 1);
    assert_eq!(source.settings().max_connections(), 0);
    assert_eq!(source.pool().options().get_max_connections(), 1);
    source.shutdown().await;
}

#[tokio::test]
async fn test_vendor_default_timeout_bounded_by_liveness_check() {
    // No override, so the pool would wait the MariaDB default of 5 minutes.
    let settings = ConnectionSettings::new("127.0.0.1", "1", "test", "user", "password");
    assert!(settings.connect_timeout().is_none());

    let started = Instant::now();
    let provisioned = MariaDbSource::open(settings).await.unwrap();
    let elapsed = started.elapsed();

    assert!(!provisioned.is_ready());
    assert!(
        elapsed < LIVENESS_CHECK_TIMEOUT + Duration::from_secs(2),
        "open took {:?}",
        elapsed
    );
    provisioned.into_source().shutdown().await;
}

#[tokio::test]
async fn test_out_of_range_connect_timeouts_from_file() {
    for secs in [0, u64::MAX] {
        let json = format!(
            r#"{{"address":"127.0.0.1","port":"1","database":"test","user":"user","password":"password","connectTimeoutSecs":{}}}"#,
            secs
        );
        let settings: ConnectionSettings = serde_json::from_str(&json).unwrap();

        let provisioned = PostgreSqlSource::open(settings).await.unwrap();
        assert!(!provisioned.is_ready(), "connectTimeoutSecs = {}", secs);
        let source = provisioned.into_source();
        assert!(source.pool().options().get_acquire_timeout() >= Duration::from_secs(1));
        source.shutdown().await;
    }
}
