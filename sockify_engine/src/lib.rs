//! Sockify Engine
//!
//! The order lifecycle and checkout settlement core of the Sockify sock store. It is independent of any particular
//! web framework, payment processor or mail provider.
//!
//! The library is divided into these sections:
//! 1. Data types ([`mod@db_types`]) and the order status machine ([`mod@status_machine`]).
//! 2. Backend contracts ([`mod@traits`]). Storage backends implement [`InventoryManagement`] and [`OrderManagement`];
//!    the hosting application supplies a [`PaymentGateway`] and a [`NotificationSink`].
//! 3. The public API ([`mod@engine_api`]): [`CheckoutApi`] for customers and the payment processor, [`OrderApi`]
//!    for store admins.
//! 4. A SQLite backend ([`SqliteDatabase`]), behind the `sqlite` feature.
pub mod db_types;
pub mod engine_api;
pub mod helpers;
pub mod status_machine;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use engine_api::{
    checkout_api::CheckoutApi,
    checkout_objects,
    errors::{CheckoutError, OrderApiError},
    order_api::OrderApi,
    order_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{CheckoutDatabase, InventoryManagement, NotificationSink, OrderManagement, PaymentGateway};
