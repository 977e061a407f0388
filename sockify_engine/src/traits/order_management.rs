use thiserror::Error;

use crate::{
    db_types::{Actor, Address, Contact, InvoiceNumber, NewOrder, Order, OrderItem, OrderStatusType, OrderUpdate},
    order_objects::{OrderQueryFilter, Pagination},
    status_machine::StatusTransitionError,
    traits::{InventoryError, PaymentOutcome, Settlement},
};

pub const ADDRESS_UPDATED_MESSAGE: &str = "Updated order address";
pub const CONTACT_UPDATED_MESSAGE: &str = "Updated order contact information";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderManagementError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("{0}")]
    InventoryError(#[from] InventoryError),
    #[error("{0}")]
    InvalidStatusTransition(#[from] StatusTransitionError),
    #[error("Order {order_id} was modified concurrently. Expected status '{expected}', but it is now '{actual}'")]
    StatusChanged { order_id: i64, expected: OrderStatusType, actual: OrderStatusType },
    #[error("Payment for order {0} has already been confirmed")]
    PaymentAlreadyConfirmed(i64),
}

impl From<sqlx::Error> for OrderManagementError {
    fn from(e: sqlx::Error) -> Self {
        OrderManagementError::DatabaseError(e.to_string())
    }
}

/// The Order Repository.
///
/// Every method that changes an order also appends exactly one row to the order's audit trail, and does both inside a
/// single transaction: either the change and its audit row are stored, or neither is.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order in the initial (`received`) state.
    ///
    /// In a single atomic transaction this
    /// * takes the stock for every item out of the inventory (conditional decrement, see [`InventoryManagement`]),
    /// * inserts the order row and
    /// * inserts the order items.
    ///
    /// If any item cannot be reserved the whole transaction is rolled back and the inventory error is returned.
    ///
    /// [`InventoryManagement`]: crate::traits::InventoryManagement
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderManagementError>;

    /// Fetches the order, including its items.
    async fn fetch_order_by_id(&self, order_id: i64) -> Result<Option<Order>, OrderManagementError>;

    async fn fetch_order_by_invoice(&self, invoice: &InvoiceNumber) -> Result<Option<Order>, OrderManagementError>;

    /// Orders matching the filter, oldest first.
    async fn fetch_orders(
        &self,
        filter: &OrderQueryFilter,
        pagination: &Pagination,
    ) -> Result<Vec<Order>, OrderManagementError>;

    async fn count_orders(&self, filter: &OrderQueryFilter) -> Result<i64, OrderManagementError>;

    async fn fetch_order_items(&self, order_id: i64) -> Result<Vec<OrderItem>, OrderManagementError>;

    /// The audit trail for the order, newest first.
    async fn fetch_order_updates(&self, order_id: i64) -> Result<Vec<OrderUpdate>, OrderManagementError>;

    /// Appends a free-text entry to the audit trail.
    async fn insert_order_update(
        &self,
        order_id: i64,
        actor: Actor,
        message: &str,
    ) -> Result<OrderUpdate, OrderManagementError>;

    /// Replaces the shipping address and records [`ADDRESS_UPDATED_MESSAGE`] in the audit trail.
    async fn update_order_address(
        &self,
        order_id: i64,
        address: &Address,
        actor: Actor,
    ) -> Result<Order, OrderManagementError>;

    /// Replaces the contact details and records [`CONTACT_UPDATED_MESSAGE`] in the audit trail.
    async fn update_order_contact(
        &self,
        order_id: i64,
        contact: &Contact,
        actor: Actor,
    ) -> Result<Order, OrderManagementError>;

    /// Moves the order from `from` to `to` and records `message` in the audit trail.
    ///
    /// The update is a compare-and-set on the current status. If the order is no longer in `from`,
    /// [`OrderManagementError::StatusChanged`] is returned and nothing is written. Moving an order into `canceled`
    /// returns its items to stock in the same transaction.
    ///
    /// The transition itself must already have been validated by the caller.
    async fn update_order_status(
        &self,
        order_id: i64,
        from: OrderStatusType,
        to: OrderStatusType,
        actor: Actor,
        message: &str,
    ) -> Result<Order, OrderManagementError>;

    /// The payment-settlement path. Only the payment processor (via the checkout orchestrator) calls this, and the
    /// resulting audit row is attributed to [`Actor::System`].
    ///
    /// * [`PaymentOutcome::Paid`] stamps the payment confirmation time on a `received`, unpaid order.
    /// * [`PaymentOutcome::Expired`] cancels a `received`, unpaid order and returns its items to stock.
    ///
    /// Settling an order a second time with the same outcome changes nothing and returns
    /// [`Settlement::AlreadySettled`].
    async fn settle_payment(
        &self,
        order_id: i64,
        outcome: PaymentOutcome,
        message: &str,
    ) -> Result<Settlement, OrderManagementError>;
}
