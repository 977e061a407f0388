//! Fixture data. The catalog and admin tables are managed outside the engine, so tests populate them directly.
use sqlx::SqlitePool;

use crate::db_types::{Cents, SockSize};

// Inserts must run to completion. A half-read `RETURNING` statement keeps its write hidden from other connections.

pub async fn seed_admin(pool: &SqlitePool, username: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
            INSERT INTO admins (firstname, lastname, email, username, password_hash)
            VALUES ($1, $2, $3, $4, 'not-a-real-hash')
        "#,
    )
    .bind(format!("{username}-first"))
    .bind(format!("{username}-last"))
    .bind(format!("{username}@sockify.test"))
    .bind(username)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

pub async fn seed_sock(pool: &SqlitePool, name: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO socks (name, description) VALUES ($1, $2)")
        .bind(name)
        .bind(format!("A pair of {name}"))
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn seed_sock_variant(
    pool: &SqlitePool,
    sock_id: i64,
    size: SockSize,
    price: Cents,
    quantity: i64,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO sock_variants (sock_id, size, price, quantity) VALUES ($1, $2, $3, $4)")
        .bind(sock_id)
        .bind(size)
        .bind(price)
        .bind(quantity)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Creates a sock with a single medium variant and returns the variant id.
pub async fn seed_variant(pool: &SqlitePool, name: &str, price: Cents, quantity: i64) -> Result<i64, sqlx::Error> {
    let sock_id = seed_sock(pool, name).await?;
    seed_sock_variant(pool, sock_id, SockSize::Medium, price, quantity).await
}

pub async fn set_variant_price(pool: &SqlitePool, variant_id: i64, price: Cents) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE sock_variants SET price = $1 WHERE sock_variant_id = $2")
        .bind(price)
        .bind(variant_id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn variant_quantity(pool: &SqlitePool, variant_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT quantity FROM sock_variants WHERE sock_variant_id = $1")
        .bind(variant_id)
        .fetch_one(pool)
        .await
}

pub async fn count_order_updates(pool: &SqlitePool, order_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM order_updates WHERE order_id = $1").bind(order_id).fetch_one(pool).await
}
