use std::{collections::HashMap, fmt::Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::Cents;

/// The session metadata key that correlates a payment session with an order id.
pub const ORDER_ID_METADATA_KEY: &str = "orderId";

//--------------------------------------     PaymentOutcome    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// The customer completed the hosted checkout.
    Paid,
    /// The session window closed without a payment.
    Expired,
}

//--------------------------------------       Settlement      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// The order changed and an audit entry was written.
    Applied,
    /// An earlier call already settled the order with the same outcome. Nothing was written.
    AlreadySettled,
}

impl Settlement {
    pub fn was_applied(&self) -> bool {
        matches!(self, Settlement::Applied)
    }
}

//--------------------------------------  CheckoutSessionRequest ------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLineItem {
    pub name: String,
    pub description: String,
    /// Price of a single unit, in minor currency units.
    pub unit_amount: Cents,
    pub quantity: i64,
}

/// Everything a payment processor needs to host a checkout page for one order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionRequest {
    pub currency: String,
    pub line_items: Vec<SessionLineItem>,
    pub success_url: String,
    pub cancel_url: String,
    pub expires_at: DateTime<Utc>,
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionRequest {
    pub fn order_id(&self) -> Option<&str> {
        self.metadata.get(ORDER_ID_METADATA_KEY).map(String::as_str)
    }
}

//--------------------------------------     PaymentSession    ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentSessionStatus {
    Open,
    Complete,
    Expired,
    Other(String),
}

impl From<&str> for PaymentSessionStatus {
    fn from(value: &str) -> Self {
        match value {
            "open" => Self::Open,
            "complete" => Self::Complete,
            "expired" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }
}

impl Display for PaymentSessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Complete => write!(f, "complete"),
            Self::Expired => write!(f, "expired"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    pub id: String,
    /// The hosted payment page. Only present while the session is open.
    pub url: Option<String>,
    pub status: PaymentSessionStatus,
    pub metadata: HashMap<String, String>,
}

impl PaymentSession {
    pub fn order_id(&self) -> Option<&str> {
        self.metadata.get(ORDER_ID_METADATA_KEY).map(String::as_str)
    }
}
