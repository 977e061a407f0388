use log::trace;
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{db_types::SockVariant, traits::InventoryError};

const VARIANT_COLUMNS: &str = r#"
    sock_variants.sock_variant_id,
    sock_variants.sock_id,
    socks.name AS sock_name,
    sock_variants.size,
    sock_variants.price,
    sock_variants.quantity,
    sock_variants.created_at
"#;

pub async fn fetch_variant(id: i64, conn: &mut SqliteConnection) -> Result<Option<SockVariant>, sqlx::Error> {
    let sql = format!(
        "SELECT {VARIANT_COLUMNS} FROM sock_variants JOIN socks ON socks.sock_id = sock_variants.sock_id WHERE \
         sock_variant_id = $1"
    );
    let variant = sqlx::query_as(&sql).bind(id).fetch_optional(conn).await?;
    Ok(variant)
}

/// Fetches all the given variants in a single query. Ids that do not exist are left out of the result.
pub async fn fetch_variants_by_ids(ids: &[i64], conn: &mut SqliteConnection) -> Result<Vec<SockVariant>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::new(format!(
        "SELECT {VARIANT_COLUMNS} FROM sock_variants JOIN socks ON socks.sock_id = sock_variants.sock_id WHERE \
         sock_variant_id IN ("
    ));
    let mut in_list = builder.separated(", ");
    for id in ids {
        in_list.push_bind(*id);
    }
    builder.push(") ORDER BY sock_variant_id");
    trace!("🗃️ Executing query: {}", builder.sql());
    let variants = builder.build_query_as::<SockVariant>().fetch_all(conn).await?;
    Ok(variants)
}

/// Takes `quantity` units out of stock with a single conditional `UPDATE`. The row only changes if enough stock is
/// left at the moment the statement runs, so concurrent reservations can never oversell.
pub async fn decrement_stock(
    variant_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), InventoryError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity { variant_id, quantity });
    }
    let result = sqlx::query(
        "UPDATE sock_variants SET quantity = quantity - $1 WHERE sock_variant_id = $2 AND quantity >= $3",
    )
    .bind(quantity)
    .bind(variant_id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 1 {
        trace!("🗃️ Reserved {quantity} units of variant #{variant_id}");
        return Ok(());
    }
    let available: Option<i64> = sqlx::query_scalar("SELECT quantity FROM sock_variants WHERE sock_variant_id = $1")
        .bind(variant_id)
        .fetch_optional(conn)
        .await?;
    match available {
        Some(available) => Err(InventoryError::InsufficientStock { variant_id, requested: quantity, available }),
        None => Err(InventoryError::VariantNotFound(variant_id)),
    }
}

pub async fn increment_stock(
    variant_id: i64,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), InventoryError> {
    if quantity <= 0 {
        return Err(InventoryError::InvalidQuantity { variant_id, quantity });
    }
    let result = sqlx::query("UPDATE sock_variants SET quantity = quantity + $1 WHERE sock_variant_id = $2")
        .bind(quantity)
        .bind(variant_id)
        .execute(conn)
        .await?;
    if result.rows_affected() == 0 {
        return Err(InventoryError::VariantNotFound(variant_id));
    }
    trace!("🗃️ Returned {quantity} units of variant #{variant_id} to stock");
    Ok(())
}
