use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{Actor, Address, Contact, InvoiceNumber, Order, OrderUpdate, ValidationError},
    engine_api::{
        errors::OrderApiError,
        order_objects::{OrderQueryFilter, OrdersPage, Pagination},
    },
    status_machine::validate_requested_transition,
    traits::OrderManagement,
};

/// Administrative access to orders: listing, lookups, audited edits and status changes.
pub struct OrderApi<B> {
    db: B,
}

impl<B> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi")
    }
}

impl<B> OrderApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B> OrderApi<B>
where B: OrderManagement
{
    /// One page of orders matching `filter`, oldest first, together with the total number of matches.
    pub async fn fetch_orders(
        &self,
        filter: OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<OrdersPage, OrderApiError> {
        trace!("📦️ Fetching orders. {filter} limit {}, offset {}", pagination.limit, pagination.offset);
        let items = self.db.fetch_orders(&filter, &pagination).await?;
        let total = self.db.count_orders(&filter).await?;
        Ok(OrdersPage { items, total, limit: pagination.limit, offset: pagination.offset })
    }

    pub async fn order_by_id(&self, order_id: i64) -> Result<Order, OrderApiError> {
        self.db.fetch_order_by_id(order_id).await?.ok_or(OrderApiError::OrderNotFound(order_id))
    }

    pub async fn order_by_invoice(&self, invoice: &InvoiceNumber) -> Result<Order, OrderApiError> {
        self.db
            .fetch_order_by_invoice(invoice)
            .await?
            .ok_or_else(|| OrderApiError::InvoiceNotFound(invoice.to_string()))
    }

    /// The order's audit trail, newest first.
    pub async fn order_updates(&self, order_id: i64) -> Result<Vec<OrderUpdate>, OrderApiError> {
        self.assert_order_exists(order_id).await?;
        let updates = self.db.fetch_order_updates(order_id).await?;
        Ok(updates)
    }

    pub async fn add_order_update(
        &self,
        order_id: i64,
        actor: Actor,
        message: &str,
    ) -> Result<OrderUpdate, OrderApiError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ValidationError("The message field is required".into()).into());
        }
        self.assert_order_exists(order_id).await?;
        let update = self.db.insert_order_update(order_id, actor, message).await?;
        debug!("📦️ {actor} added a note to order #{order_id}");
        Ok(update)
    }

    pub async fn update_address(&self, order_id: i64, address: Address, actor: Actor) -> Result<Order, OrderApiError> {
        address.validate()?;
        let address = address.normalized();
        let order = self.db.update_order_address(order_id, &address, actor).await?;
        info!("📦️ {actor} updated the address of order #{order_id}");
        Ok(order)
    }

    pub async fn update_contact(&self, order_id: i64, contact: Contact, actor: Actor) -> Result<Order, OrderApiError> {
        contact.validate()?;
        let order = self.db.update_order_contact(order_id, &contact, actor).await?;
        info!("📦️ {actor} updated the contact details of order #{order_id}");
        Ok(order)
    }

    /// Moves the order to `new_status`, which arrives as free text from the caller.
    ///
    /// The transition is checked against the status machine before anything is written. If `message` is blank, a
    /// default audit message naming both statuses is recorded instead.
    pub async fn update_status(
        &self,
        order_id: i64,
        new_status: &str,
        message: Option<&str>,
        actor: Actor,
    ) -> Result<Order, OrderApiError> {
        let order = self.order_by_id(order_id).await?;
        let from = order.status;
        let to = validate_requested_transition(from, new_status)?;
        let message = match message.map(str::trim).filter(|m| !m.is_empty()) {
            Some(m) => m.to_string(),
            None => default_status_message(&from, &to),
        };
        let order = self.db.update_order_status(order_id, from, to, actor, &message).await?;
        info!("📦️ {actor} moved order #{order_id} from '{from}' to '{to}'");
        Ok(order)
    }

    async fn assert_order_exists(&self, order_id: i64) -> Result<(), OrderApiError> {
        match self.db.fetch_order_by_id(order_id).await? {
            Some(_) => Ok(()),
            None => Err(OrderApiError::OrderNotFound(order_id)),
        }
    }
}

pub fn default_status_message<S: std::fmt::Display>(from: &S, to: &S) -> String {
    format!("Order status changed from '{from}' to '{to}'")
}
