//! Adapters that connect the engine's collaborator traits to real services.
//!
//! * [`stripe::StripeGateway`] is the [`PaymentGateway`](sockify_engine::PaymentGateway), backed by Stripe Checkout.
//! * [`email::EmailNotifier`] is the [`NotificationSink`](sockify_engine::NotificationSink), backed by SendGrid.
pub mod email;
pub mod email_templates;
pub mod stripe;
