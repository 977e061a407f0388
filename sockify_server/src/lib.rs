//! # Sockify server
//! The HTTP front end of the Sockify sock store. It is responsible for:
//! * Taking customer carts, placing orders and opening Stripe checkout sessions for them.
//! * Settling orders when customers return from the Stripe payment page, and mailing order confirmations.
//! * Letting store admins look up orders and change their status, shipping address and contact details.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information, or run
//! the server binary with any argument to print a summary.
//!
//! ## Routes
//! The server exposes the following routes:
//! * `GET /health`: A health check route that returns a 200 OK response.
//! * `POST /api/v1/cart/checkout/stripe-session`: Place an order and get a payment URL back.
//! * `GET /api/v1/cart/checkout/stripe-confirmation/{session_id}`: Settle the order paid for in a checkout session.
//! * `/api/v1/orders/...`: Order management. These routes require an admin access token.
//!   * `GET /api/v1/orders?status=&limit=&offset=`
//!   * `GET /api/v1/orders/{order_id}`
//!   * `GET /api/v1/orders/invoice/{invoice_number}`
//!   * `PATCH /api/v1/orders/{order_id}/status`
//!   * `PATCH /api/v1/orders/{order_id}/address`
//!   * `PATCH /api/v1/orders/{order_id}/contact`
//!   * `GET /api/v1/orders/{order_id}/updates`
//!   * `POST /api/v1/orders/{order_id}/updates`

pub mod auth;
pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod helpers;
pub mod integrations;
pub mod middleware;
pub mod routes;
pub mod server;
