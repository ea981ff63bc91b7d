//! CRUD operations on the `some_table (id, message)` fixture.
//!
//! Every statement borrows a connection from the pool for its own duration
//! and returns it afterwards. Queries are written once per driver because
//! the bind placeholders differ.

use crate::db::DbPool;
use crate::error::DbResult;
use crate::impl_db_dispatch;
use crate::models::{MESSAGE_TABLE, Message};
use sqlx::Row;
use tracing::{info, warn};

/// Create the fixture table if it does not exist yet.
pub async fn prepare_table(pool: &DbPool) -> DbResult<()> {
    let sql = format!(
        "CREATE TABLE IF NOT EXISTS {} (id INTEGER, message TEXT)",
        MESSAGE_TABLE
    );
    impl_db_dispatch!(pool, {
        MySql(p) => {
            sqlx::query(&sql).execute(p).await?;
        },
        Postgres(p) => {
            sqlx::query(&sql).execute(p).await?;
        }
    });
    Ok(())
}

/// Drop the fixture table.
pub async fn clear_table(pool: &DbPool) -> DbResult<()> {
    let sql = format!("DROP TABLE IF EXISTS {}", MESSAGE_TABLE);
    impl_db_dispatch!(pool, {
        MySql(p) => {
            sqlx::query(&sql).execute(p).await?;
        },
        Postgres(p) => {
            sqlx::query(&sql).execute(p).await?;
        }
    });
    Ok(())
}

pub async fn insert_message(pool: &DbPool, id: i32, message: &str) -> DbResult<()> {
    let vendor = pool.vendor();
    let sql = format!(
        "INSERT INTO {} (id, message) VALUES ({}, {})",
        MESSAGE_TABLE,
        vendor.placeholder(1),
        vendor.placeholder(2)
    );
    impl_db_dispatch!(pool, {
        MySql(p) => {
            sqlx::query(&sql).bind(id).bind(message).execute(p).await?;
        },
        Postgres(p) => {
            sqlx::query(&sql).bind(id).bind(message).execute(p).await?;
        }
    });
    Ok(())
}

/// Fetch the row with `id`, if any.
pub async fn find_message(pool: &DbPool, id: i32) -> DbResult<Option<Message>> {
    let sql = format!(
        "SELECT id, message FROM {} WHERE id = {}",
        MESSAGE_TABLE,
        pool.vendor().placeholder(1)
    );
    let message = impl_db_dispatch!(pool, {
        MySql(p) => match sqlx::query(&sql).bind(id).fetch_optional(p).await? {
            Some(row) => Some(Message::new(
                row.try_get("id")?,
                row.try_get::<String, _>("message")?,
            )),
            None => None,
        },
        Postgres(p) => match sqlx::query(&sql).bind(id).fetch_optional(p).await? {
            Some(row) => Some(Message::new(
                row.try_get("id")?,
                row.try_get::<String, _>("message")?,
            )),
            None => None,
        },
    });
    Ok(message)
}

/// Fetch every row, ordered by id.
pub async fn list_messages(pool: &DbPool) -> DbResult<Vec<Message>> {
    let sql = format!("SELECT id, message FROM {} ORDER BY id", MESSAGE_TABLE);
    let messages = impl_db_dispatch!(pool, {
        MySql(p) => sqlx::query(&sql)
            .fetch_all(p)
            .await?
            .iter()
            .map(|row| -> Result<Message, sqlx::Error> {
                Ok(Message::new(row.try_get("id")?, row.try_get::<String, _>("message")?))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?,
        Postgres(p) => sqlx::query(&sql)
            .fetch_all(p)
            .await?
            .iter()
            .map(|row| -> Result<Message, sqlx::Error> {
                Ok(Message::new(row.try_get("id")?, row.try_get::<String, _>("message")?))
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?,
    });
    Ok(messages)
}

/// Insert, read back and list a couple of rows, then drop the table.
///
/// The first failing step is logged and ends the walkthrough; nothing is retried.
/// Returns the rows listed before cleanup.
pub async fn run_walkthrough(pool: &DbPool) -> DbResult<Vec<Message>> {
    let vendor = pool.vendor();

    prepare_table(pool)
        .await
        .inspect_err(|e| warn!(%vendor, error = %e, "Could not prepare table"))?;

    insert_message(pool, 10, "some message")
        .await
        .inspect_err(|e| warn!(%vendor, error = %e, "Could not insert data"))?;
    info!(%vendor, "Inserted a new message");

    let found = find_message(pool, 10)
        .await
        .inspect_err(|e| warn!(%vendor, error = %e, "Could not retrieve data"))?;
    if let Some(row) = &found {
        info!(%vendor, id = row.id, message = %row.message, "Retrieved message");
    }

    insert_message(pool, 11, "some other message")
        .await
        .inspect_err(|e| warn!(%vendor, error = %e, "Could not insert data"))?;

    let all = list_messages(pool)
        .await
        .inspect_err(|e| warn!(%vendor, error = %e, "Could not retrieve data"))?;
    for row in &all {
        info!(%vendor, id = row.id, message = %row.message, "Retrieved message");
    }

    clear_table(pool)
        .await
        .inspect_err(|e| warn!(%vendor, error = %e, "Could not clear table"))?;

    Ok(all)
}
