//! `SqliteDatabase` is the SQLite backend for the Sockify engine.
//!
//! It implements both storage traits from the [`traits`](crate::traits) module, so it can drive the checkout
//! workflow as well as the admin order operations.
use std::fmt::Debug;

use log::*;
use sqlx::{SqliteConnection, SqlitePool};

use super::db::{db_url, inventory, new_pool, order_updates, orders};
use crate::{
    db_types::{
        Actor,
        Address,
        Contact,
        InvoiceNumber,
        NewOrder,
        Order,
        OrderItem,
        OrderStatusType,
        OrderUpdate,
        SockVariant,
    },
    order_objects::{OrderQueryFilter, Pagination},
    status_machine::{validate_transition, StatusTransitionError},
    traits::{
        InventoryError,
        InventoryManagement,
        OrderManagement,
        OrderManagementError,
        PaymentOutcome,
        Settlement,
        ADDRESS_UPDATED_MESSAGE,
        CONTACT_UPDATED_MESSAGE,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl InventoryManagement for SqliteDatabase {
    async fn fetch_variants_by_ids(&self, ids: &[i64]) -> Result<Vec<SockVariant>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let variants = inventory::fetch_variants_by_ids(ids, &mut conn).await?;
        Ok(variants)
    }

    async fn fetch_variant(&self, id: i64) -> Result<Option<SockVariant>, InventoryError> {
        let mut conn = self.pool.acquire().await?;
        let variant = inventory::fetch_variant(id, &mut conn).await?;
        Ok(variant)
    }

    async fn reserve_stock(&self, variant_id: i64, quantity: i64) -> Result<SockVariant, InventoryError> {
        let mut tx = self.pool.begin().await?;
        inventory::decrement_stock(variant_id, quantity, &mut tx).await?;
        let variant =
            inventory::fetch_variant(variant_id, &mut tx).await?.ok_or(InventoryError::VariantNotFound(variant_id))?;
        tx.commit().await?;
        Ok(variant)
    }

    async fn release_stock(&self, variant_id: i64, quantity: i64) -> Result<SockVariant, InventoryError> {
        let mut tx = self.pool.begin().await?;
        inventory::increment_stock(variant_id, quantity, &mut tx).await?;
        let variant =
            inventory::fetch_variant(variant_id, &mut tx).await?.ok_or(InventoryError::VariantNotFound(variant_id))?;
        tx.commit().await?;
        Ok(variant)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError> {
        if order.items.is_empty() {
            return Err(OrderManagementError::DatabaseError("An order must contain at least one item".into()));
        }
        let mut tx = self.pool.begin().await?;
        // Reserving stock is the first write, so this transaction holds the write lock before anything else happens.
        for item in &order.items {
            inventory::decrement_stock(item.sock_variant_id, item.quantity, &mut tx).await?;
        }
        let order_id = orders::insert_order(&order, &mut tx).await?;
        let order = fetch_existing(order_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} [{}] saved with {} items", order.invoice_number, order.items.len());
        Ok(order)
    }

    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_order_by_invoice(&self, invoice: &InvoiceNumber) -> Result<Option<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_invoice(invoice, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders(
        &self,
        filter: &OrderQueryFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Order>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::search_orders(filter, pagination, &mut conn).await?;
        Ok(orders)
    }

    async fn count_orders(&self, filter: &OrderQueryFilter) -> Result<i64, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let count = orders::count_orders(filter, &mut conn).await?;
        Ok(count)
    }

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let items = orders::fetch_order_items(order_id, &mut conn).await?;
        Ok(items)
    }

    async fn fetch_order_updates(&self, order_id: i64) -> Result<Vec<OrderUpdate>, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let updates = order_updates::fetch_order_updates(order_id, &mut conn).await?;
        Ok(updates)
    }

    async fn insert_order_update(
        &self,
        order_id: i64,
        actor: Actor,
        message: &str,
    ) -> Result<OrderUpdate, OrderManagementError> {
        let mut conn = self.pool.acquire().await?;
        let update = order_updates::insert_order_update(order_id, actor, message, &mut conn).await?;
        Ok(update)
    }

    async fn update_order_address(
        &self,
        order_id: i64,
        address: &Address,
        actor: Actor,
    ) -> Result<Order, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        if !orders::update_address(order_id, address, &mut tx).await? {
            return Err(OrderManagementError::OrderNotFound(order_id));
        }
        order_updates::insert_order_update(order_id, actor, ADDRESS_UPDATED_MESSAGE, &mut tx).await?;
        let order = fetch_existing(order_id, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn update_order_contact(
        &self,
        order_id: i64,
        contact: &Contact,
        actor: Actor,
    ) -> Result<Order, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        if !orders::update_contact(order_id, contact, &mut tx).await? {
            return Err(OrderManagementError::OrderNotFound(order_id));
        }
        order_updates::insert_order_update(order_id, actor, CONTACT_UPDATED_MESSAGE, &mut tx).await?;
        let order = fetch_existing(order_id, &mut tx).await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn update_order_status(
        &self,
        order_id: i64,
        from: OrderStatusType,
        to: OrderStatusType,
        actor: Actor,
        message: &str,
    ) -> Result<Order, OrderManagementError> {
        validate_transition(from, to)?;
        let mut tx = self.pool.begin().await?;
        if !orders::update_status_if(order_id, from, to, &mut tx).await? {
            let current = orders::fetch_order_by_id(order_id, &mut tx).await?;
            return match current {
                Some(order) => {
                    warn!("🗃️ Order #{order_id} is '{}', not '{from}'. Status update to '{to}' dropped", order.status);
                    Err(OrderManagementError::StatusChanged { order_id, expected: from, actual: order.status })
                },
                None => Err(OrderManagementError::OrderNotFound(order_id)),
            };
        }
        if to == OrderStatusType::Canceled {
            restock_order(order_id, &mut tx).await?;
        }
        order_updates::insert_order_update(order_id, actor, message, &mut tx).await?;
        let order = fetch_existing(order_id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order #{order_id} moved from '{from}' to '{to}' by {actor}");
        Ok(order)
    }

    async fn settle_payment(
        &self,
        order_id: i64,
        outcome: PaymentOutcome,
        message: &str,
    ) -> Result<Settlement, OrderManagementError> {
        let mut tx = self.pool.begin().await?;
        let applied = match outcome {
            PaymentOutcome::Paid => orders::mark_payment_confirmed(order_id, &mut tx).await?,
            PaymentOutcome::Expired => {
                let canceled = orders::cancel_unpaid_order(order_id, &mut tx).await?;
                if canceled {
                    restock_order(order_id, &mut tx).await?;
                }
                canceled
            },
        };
        if applied {
            order_updates::insert_order_update(order_id, Actor::System, message, &mut tx).await?;
            tx.commit().await?;
            debug!("🗃️ Payment outcome {outcome:?} applied to order #{order_id}");
            return Ok(Settlement::Applied);
        }
        let order = fetch_existing(order_id, &mut tx).await?;
        tx.rollback().await?;
        match (outcome, order.is_paid(), order.status) {
            (PaymentOutcome::Paid, true, _) => Ok(Settlement::AlreadySettled),
            (PaymentOutcome::Expired, true, _) => Err(OrderManagementError::PaymentAlreadyConfirmed(order_id)),
            (PaymentOutcome::Expired, false, OrderStatusType::Canceled) => Ok(Settlement::AlreadySettled),
            (PaymentOutcome::Paid, false, status) => Err(StatusTransitionError::IllegalTransition {
                from: status,
                to: OrderStatusType::Received.to_string(),
            }
            .into()),
            (PaymentOutcome::Expired, false, status) => {
                let err = match validate_transition(status, OrderStatusType::Canceled) {
                    Err(e) => e,
                    Ok(()) => StatusTransitionError::IllegalTransition {
                        from: status,
                        to: OrderStatusType::Canceled.to_string(),
                    },
                };
                Err(err.into())
            },
        }
    }
}

async fn fetch_existing(order_id: i64, conn: &mut SqliteConnection) -> Result<Order, OrderManagementError> {
    orders::fetch_order_by_id(order_id, conn).await?.ok_or(OrderManagementError::OrderNotFound(order_id))
}

/// Returns every item of the order to stock.
async fn restock_order(order_id: i64, conn: &mut SqliteConnection) -> Result<(), OrderManagementError> {
    let items = orders::fetch_order_items(order_id, conn).await?;
    for item in &items {
        inventory::increment_stock(item.sock_variant_id, item.quantity, conn).await?;
    }
    trace!("🗃️ {} items of order #{order_id} returned to stock", items.len());
    Ok(())
}

impl SqliteDatabase {
    /// Creates a new database API object using the URL in `SOCKIFY_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
