use sqlx::SqliteConnection;

use crate::db_types::{Actor, OrderUpdate};

const SELECT_UPDATES: &str = r#"
    SELECT
        order_updates.order_update_id,
        order_updates.order_id,
        order_updates.admin_id,
        order_updates.message,
        order_updates.created_at,
        admins.firstname,
        admins.lastname,
        admins.username
    FROM order_updates
    LEFT JOIN admins ON admins.admin_id = order_updates.admin_id
"#;

/// Appends an entry to the order's audit trail. Entries are never changed or removed afterwards.
pub async fn insert_order_update(
    order_id: i64,
    actor: Actor,
    message: &str,
    conn: &mut SqliteConnection,
) -> Result<OrderUpdate, sqlx::Error> {
    let id = sqlx::query("INSERT INTO order_updates (order_id, admin_id, message) VALUES ($1, $2, $3)")
        .bind(order_id)
        .bind(actor.admin_id())
        .bind(message)
        .execute(&mut *conn)
        .await?
        .last_insert_rowid();
    let sql = format!("{SELECT_UPDATES} WHERE order_updates.order_update_id = $1");
    let update = sqlx::query_as(&sql).bind(id).fetch_one(conn).await?;
    Ok(update)
}

/// The audit trail for an order, newest first.
pub async fn fetch_order_updates(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderUpdate>, sqlx::Error> {
    let sql = format!(
        "{SELECT_UPDATES} WHERE order_updates.order_id = $1 ORDER BY order_updates.created_at DESC, \
         order_updates.order_update_id DESC"
    );
    let updates = sqlx::query_as(&sql).bind(order_id).fetch_all(conn).await?;
    Ok(updates)
}
