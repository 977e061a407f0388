//! # SQLite Database methods
//!
//! Low-level SQLite interactions for the order and inventory stores.
//!
//! Every function here is a plain async fn that takes a `&mut SqliteConnection`. Callers can pass a pooled connection,
//! or open a transaction and pass `&mut tx` when several calls must succeed or fail together.
use std::{env, str::FromStr};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Error as SqlxError,
    SqlitePool,
};

pub mod inventory;
pub mod order_updates;
pub mod orders;

const SQLITE_DB_URL: &str = "sqlite://data/sockify.db";

pub fn db_url() -> String {
    let result = env::var("SOCKIFY_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ SOCKIFY_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqlxError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true).foreign_keys(true);
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    Ok(pool)
}
