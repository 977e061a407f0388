mod api;
mod config;
mod error;
mod helpers;

mod data_objects;

pub use api::StripeApi;
pub use config::StripeConfig;
pub use data_objects::{CheckoutSession, NewCheckoutSession, NewLineItem};
pub use error::StripeApiError;
pub use helpers::checkout_session_form;
