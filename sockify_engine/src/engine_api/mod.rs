//! The public face of the engine.
//!
//! [`CheckoutApi`] drives the customer checkout and payment settlement. [`OrderApi`] serves the admin order
//! operations. Both are generic over their storage backend, so any type implementing the traits in
//! [`crate::traits`] can stand in for the SQLite database.
pub mod checkout_api;
pub mod checkout_objects;
pub mod errors;
pub mod order_api;
pub mod order_objects;
