use std::collections::HashMap;

use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{Address, Contact, InvoiceNumber, NewOrder, Order, OrderItem, OrderStatusType},
    order_objects::{OrderQueryFilter, Pagination},
};

/// Inserts the order row and its items, returning the new order id. This is not atomic. Run it inside a transaction
/// (pass `&mut tx`) together with the stock reservation.
pub async fn insert_order(order: &NewOrder, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let order_id: i64 = sqlx::query_scalar(
        r#"
            INSERT INTO orders (
                invoice_number,
                total_price,
                status,
                firstname,
                lastname,
                email,
                phone,
                street,
                apt_unit,
                state,
                zipcode
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING order_id;
        "#,
    )
    .bind(&order.invoice_number)
    .bind(order.total_price())
    .bind(OrderStatusType::Received)
    .bind(&order.contact.firstname)
    .bind(&order.contact.lastname)
    .bind(&order.contact.email)
    .bind(&order.contact.phone)
    .bind(&order.address.street)
    .bind(&order.address.apt_unit)
    .bind(&order.address.state)
    .bind(&order.address.zipcode)
    .fetch_one(&mut *conn)
    .await?;

    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("INSERT INTO order_items (order_id, sock_variant_id, name, size, price, quantity) ");
    builder.push_values(order.items.iter(), |mut row, item| {
        row.push_bind(order_id)
            .push_bind(item.sock_variant_id)
            .push_bind(&item.name)
            .push_bind(item.size)
            .push_bind(item.price)
            .push_bind(item.quantity);
    });
    builder.build().execute(conn).await?;
    debug!("🗃️ Order [{}] inserted with id {order_id}", order.invoice_number);
    Ok(order_id)
}

pub async fn fetch_order_items(order_id: i64, conn: &mut SqliteConnection) -> Result<Vec<OrderItem>, sqlx::Error> {
    let items = sqlx::query_as("SELECT * FROM order_items WHERE order_id = $1 ORDER BY order_item_id")
        .bind(order_id)
        .fetch_all(conn)
        .await?;
    Ok(items)
}

/// Fetches the order with the given id, items included.
pub async fn fetch_order_by_id(order_id: i64, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> =
        sqlx::query_as("SELECT * FROM orders WHERE order_id = $1").bind(order_id).fetch_optional(&mut *conn).await?;
    with_items(order, conn).await
}

pub async fn fetch_order_by_invoice(
    invoice: &InvoiceNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE invoice_number = $1")
        .bind(invoice)
        .fetch_optional(&mut *conn)
        .await?;
    with_items(order, conn).await
}

async fn with_items(order: Option<Order>, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    match order {
        Some(mut order) => {
            order.items = fetch_order_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &OrderQueryFilter) {
    if let Some(status) = filter.status {
        builder.push(" WHERE status = ");
        builder.push_bind(status);
    }
}

/// Fetches one page of orders matching the filter, sorted by creation time (then id), items included.
pub async fn search_orders(
    filter: &OrderQueryFilter,
    pagination: &Pagination,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders");
    push_filter(&mut builder, filter);
    builder.push(" ORDER BY created_at ASC, order_id ASC LIMIT ");
    builder.push_bind(pagination.limit);
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset);
    trace!("🗃️ Executing query: {}", builder.sql());
    let mut orders = builder.build_query_as::<Order>().fetch_all(&mut *conn).await?;
    if orders.is_empty() {
        return Ok(orders);
    }

    let mut items_query = QueryBuilder::new("SELECT * FROM order_items WHERE order_id IN (");
    let mut in_list = items_query.separated(", ");
    for order in &orders {
        in_list.push_bind(order.id);
    }
    items_query.push(") ORDER BY order_item_id");
    let items = items_query.build_query_as::<OrderItem>().fetch_all(conn).await?;
    let mut items_by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        items_by_order.entry(item.order_id).or_default().push(item);
    }
    for order in &mut orders {
        order.items = items_by_order.remove(&order.id).unwrap_or_default();
    }
    trace!("🗃️ Result of search_orders: {}", orders.len());
    Ok(orders)
}

pub async fn count_orders(filter: &OrderQueryFilter, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_filter(&mut builder, filter);
    let count: i64 = builder.build_query_scalar().fetch_one(conn).await?;
    Ok(count)
}

/// Compare-and-set on the status column. Returns `false` if the order was not in `from` (or does not exist).
pub async fn update_status_if(
    order_id: i64,
    from: OrderStatusType,
    to: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 AND status = $3",
    )
    .bind(to)
    .bind(order_id)
    .bind(from)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Stamps the payment time on a `received` order that has not been paid yet. Returns `false` if nothing changed.
pub async fn mark_payment_confirmed(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE orders SET payment_confirmed_at = CURRENT_TIMESTAMP, updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status = 'received' AND payment_confirmed_at IS NULL
        "#,
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Cancels a `received` order that has not been paid. Returns `false` if nothing changed.
pub async fn cancel_unpaid_order(order_id: i64, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE orders SET status = 'canceled', updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status = 'received' AND payment_confirmed_at IS NULL
        "#,
    )
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn update_address(
    order_id: i64,
    address: &Address,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE orders SET street = $1, apt_unit = $2, state = $3, zipcode = $4, updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $5
        "#,
    )
    .bind(&address.street)
    .bind(&address.apt_unit)
    .bind(&address.state)
    .bind(&address.zipcode)
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn update_contact(
    order_id: i64,
    contact: &Contact,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
            UPDATE orders SET firstname = $1, lastname = $2, email = $3, phone = $4, updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $5
        "#,
    )
    .bind(&contact.firstname)
    .bind(&contact.lastname)
    .bind(&contact.email)
    .bind(&contact.phone)
    .bind(order_id)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}
