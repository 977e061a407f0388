use chrono::Duration;
use serde::{Deserialize, Serialize};
use sockify_common::DEFAULT_CURRENCY_CODE;

use crate::db_types::{Address, Contact, InvoiceNumber};

pub const DEFAULT_SESSION_TTL: Duration = Duration::minutes(30);

/// One line of a customer's cart. Prices are deliberately absent: they are always read from the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub sock_variant_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub items: Vec<CartItem>,
    pub address: Address,
    pub contact: Contact,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutResult {
    pub order_id: i64,
    pub invoice_number: InvoiceNumber,
    pub payment_url: String,
}

/// Settings for the hosted payment sessions the checkout creates. Built once at startup.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub currency: String,
    pub session_ttl: Duration,
    /// Where the payment processor sends the customer after paying. May contain the processor's own placeholders.
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutConfig {
    /// Derives the success and cancel URLs from the storefront's base URL.
    pub fn for_web_client(web_client_url: &str) -> Self {
        let base = web_client_url.trim_end_matches('/');
        Self {
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            session_ttl: DEFAULT_SESSION_TTL,
            success_url: format!("{base}/cart/checkout/order-confirmation?session_id={{CHECKOUT_SESSION_ID}}"),
            cancel_url: format!("{base}/cart/checkout/payment-canceled"),
        }
    }

    pub fn with_currency<S: Into<String>>(mut self, currency: S) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self::for_web_client("http://localhost:5173")
    }
}
