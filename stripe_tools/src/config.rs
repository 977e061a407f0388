use log::*;
use sockify_common::{helpers::non_empty, Secret};

pub const DEFAULT_STRIPE_API_URL: &str = "https://api.stripe.com";

#[derive(Debug, Clone, Default)]
pub struct StripeConfig {
    /// Base URL of the Stripe API, without the version prefix.
    pub api_url: String,
    pub secret_key: Secret<String>,
}

impl StripeConfig {
    pub fn new<S: Into<String>>(api_url: S, secret_key: Secret<String>) -> Self {
        Self { api_url: api_url.into(), secret_key }
    }

    pub fn new_from_env_or_default() -> Self {
        let api_url = non_empty(std::env::var("SOCKIFY_STRIPE_API_URL").ok()).unwrap_or_else(|| {
            debug!("💳️ SOCKIFY_STRIPE_API_URL not set, using {DEFAULT_STRIPE_API_URL}");
            DEFAULT_STRIPE_API_URL.to_string()
        });
        let secret_key = Secret::new(non_empty(std::env::var("SOCKIFY_STRIPE_SECRET_KEY").ok()).unwrap_or_else(|| {
            warn!("💳️ SOCKIFY_STRIPE_SECRET_KEY not set. Checkout sessions can not be created until it is.");
            String::default()
        }));
        Self { api_url, secret_key }
    }
}
