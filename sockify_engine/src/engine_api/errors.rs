use thiserror::Error;

use crate::{
    db_types::{OrderStatusType, ValidationError},
    status_machine::StatusTransitionError,
    traits::{InventoryError, OrderManagementError, PaymentGatewayError},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("{0}")]
    InvalidRequest(#[from] ValidationError),
    #[error("The cart is empty")]
    EmptyCart,
    #[error("Invalid quantity {quantity} requested for sock variant {variant_id}")]
    InvalidQuantity { variant_id: i64, quantity: i64 },
    #[error("Sock variant {0} does not exist")]
    VariantNotFound(i64),
    #[error("Sock variant {variant_id} is out of stock. Requested {requested}, but only {available} available")]
    InsufficientStock { variant_id: i64, requested: i64, available: i64 },
    #[error("The checkout session ID was not provided or does not exist")]
    MissingSessionId,
    #[error("The checkout session does not reference a valid order. {0}")]
    InvalidSessionMetadata(String),
    #[error("Payment for this order is still pending")]
    PaymentPending,
    #[error("The checkout session was not completed. The order has been canceled")]
    PaymentIncomplete,
    #[error("Payment for order {0} has already been confirmed")]
    PaymentAlreadyConfirmed(i64),
    #[error("Unexpected checkout session status: {0}")]
    UnexpectedSessionStatus(String),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("{0}")]
    InvalidStatusTransition(#[from] StatusTransitionError),
    #[error("Order {order_id} was modified concurrently (now '{actual}')")]
    ConcurrentModification { order_id: i64, actual: OrderStatusType },
    #[error("Payment gateway error. {0}")]
    PaymentGatewayError(#[from] PaymentGatewayError),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<InventoryError> for CheckoutError {
    fn from(e: InventoryError) -> Self {
        match e {
            InventoryError::DatabaseError(s) => Self::DatabaseError(s),
            InventoryError::VariantNotFound(id) => Self::VariantNotFound(id),
            InventoryError::InsufficientStock { variant_id, requested, available } => {
                Self::InsufficientStock { variant_id, requested, available }
            },
            InventoryError::InvalidQuantity { variant_id, quantity } => Self::InvalidQuantity { variant_id, quantity },
        }
    }
}

impl From<OrderManagementError> for CheckoutError {
    fn from(e: OrderManagementError) -> Self {
        match e {
            OrderManagementError::DatabaseError(s) => Self::DatabaseError(s),
            OrderManagementError::OrderNotFound(id) => Self::OrderNotFound(id),
            OrderManagementError::InventoryError(e) => e.into(),
            OrderManagementError::InvalidStatusTransition(e) => Self::InvalidStatusTransition(e),
            OrderManagementError::StatusChanged { order_id, actual, .. } => {
                Self::ConcurrentModification { order_id, actual }
            },
            OrderManagementError::PaymentAlreadyConfirmed(id) => Self::PaymentAlreadyConfirmed(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderApiError {
    #[error("{0}")]
    InvalidRequest(#[from] ValidationError),
    #[error("Order {0} does not exist")]
    OrderNotFound(i64),
    #[error("No order with invoice number {0} exists")]
    InvoiceNotFound(String),
    #[error("{0}")]
    InvalidStatusTransition(#[from] StatusTransitionError),
    #[error("Order {order_id} was modified concurrently. Expected '{expected}', but it is now '{actual}'")]
    ConcurrentModification { order_id: i64, expected: OrderStatusType, actual: OrderStatusType },
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<OrderManagementError> for OrderApiError {
    fn from(e: OrderManagementError) -> Self {
        match e {
            OrderManagementError::OrderNotFound(id) => Self::OrderNotFound(id),
            OrderManagementError::InvalidStatusTransition(e) => Self::InvalidStatusTransition(e),
            OrderManagementError::StatusChanged { order_id, expected, actual } => {
                Self::ConcurrentModification { order_id, expected, actual }
            },
            OrderManagementError::DatabaseError(s) => Self::DatabaseError(s),
            e @ (OrderManagementError::InventoryError(_) | OrderManagementError::PaymentAlreadyConfirmed(_)) => {
                Self::DatabaseError(e.to_string())
            },
        }
    }
}
