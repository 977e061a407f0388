//! # Backend and collaborator contracts.
//!
//! This module defines the interfaces the checkout engine needs from the outside world. Storage backends implement
//! the first two; the server supplies the last two.
//!
//! * [`InventoryManagement`] is the inventory ledger: stock levels per sock variant, changed only through atomic
//!   conditional updates.
//! * [`OrderManagement`] is the order repository: orders, their items and the append-only audit trail.
//! * [`PaymentGateway`] creates hosted checkout sessions and reports their status.
//! * [`NotificationSink`] sends order confirmations.
//!
//! [`CheckoutDatabase`] is shorthand for a backend that provides both storage traits.
mod data_objects;
mod inventory_management;
mod notifications;
mod order_management;
mod payment_gateway;

pub use data_objects::{
    CheckoutSessionRequest,
    PaymentOutcome,
    PaymentSession,
    PaymentSessionStatus,
    SessionLineItem,
    Settlement,
    ORDER_ID_METADATA_KEY,
};
pub use inventory_management::{InventoryError, InventoryManagement};
pub use notifications::{NotificationError, NotificationSink};
pub use order_management::{OrderManagement, OrderManagementError, ADDRESS_UPDATED_MESSAGE, CONTACT_UPDATED_MESSAGE};
pub use payment_gateway::{PaymentGateway, PaymentGatewayError};

/// A storage backend that can run the whole checkout workflow.
pub trait CheckoutDatabase: InventoryManagement + OrderManagement {}

impl<T: InventoryManagement + OrderManagement> CheckoutDatabase for T {}
