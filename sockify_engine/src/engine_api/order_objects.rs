use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db_types::{Address, Cents, InvoiceNumber, Order, OrderItem, OrderStatusType};

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;

//--------------------------------------   OrderQueryFilter    ---------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrderQueryFilter {
    pub status: Option<OrderStatusType>,
}

impl OrderQueryFilter {
    pub fn with_status(mut self, status: OrderStatusType) -> Self {
        self.status = Some(status);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none()
    }
}

impl Display for OrderQueryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.status {
            None => write!(f, "No filters."),
            Some(status) => write!(f, "status: {status}."),
        }
    }
}

//--------------------------------------      Pagination       ---------------------------------------------------------
/// A window onto a list result. Use [`Pagination::new`] to build one from untrusted input; out-of-range values fall
/// back to the defaults instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { limit: DEFAULT_PAGE_LIMIT, offset: 0 }
    }
}

impl Pagination {
    pub fn new(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(l) if l > 0 => l.min(MAX_PAGE_LIMIT),
            _ => DEFAULT_PAGE_LIMIT,
        };
        let offset = offset.filter(|o| *o >= 0).unwrap_or(0);
        Self { limit, offset }
    }
}

//--------------------------------------      OrdersPage       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct OrdersPage {
    pub items: Vec<Order>,
    /// The number of orders matching the filter, ignoring pagination.
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

//--------------------------------------   OrderConfirmation   ---------------------------------------------------------
/// The summary a customer sees (and is e-mailed) once their payment has gone through.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub invoice_number: InvoiceNumber,
    pub status: OrderStatusType,
    pub total: Cents,
    pub address: Address,
    pub items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderConfirmation {
    fn from(order: &Order) -> Self {
        Self {
            invoice_number: order.invoice_number.clone(),
            status: order.status,
            total: order.total,
            address: order.address.clone(),
            items: order.items.clone(),
            created_at: order.created_at,
        }
    }
}
