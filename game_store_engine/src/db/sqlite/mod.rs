//! # SQLite backend
//!
//! The per-table modules hold "low-level" queries as free functions that take a `&mut SqliteConnection`. Callers
//! either pass a pooled connection or open a transaction and pass it to several of them, so the same functions
//! serve single statements and atomic multi-table writes alike.
//!
//! [`SqliteDatabase`] owns the pool and implements the storage traits on top of these functions.
use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

mod db;

pub mod customers;
pub mod games;
pub mod order_lines;
pub mod orders;
pub mod ownership;
pub mod payments;

pub use db::SqliteDatabase;

/// Writers queue on the WAL write lock for up to this long before giving up with a busy error.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
