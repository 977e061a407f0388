use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sockify_engine::{
    checkout_objects::{CartItem, CheckoutRequest},
    db_types::{Address, Contact, OrderStatusType},
    order_objects::{OrderQueryFilter, Pagination},
};

use crate::errors::ServerError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub message: String,
}

impl JsonResponse {
    pub fn new<S: Display>(message: S) -> Self {
        Self { message: message.to_string() }
    }
}

//----------------------------------------------   Checkout  ----------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutBody {
    #[serde(alias = "cartItems")]
    pub items: Vec<CartItem>,
    pub address: Address,
    pub contact: Contact,
}

impl From<CheckoutBody> for CheckoutRequest {
    fn from(body: CheckoutBody) -> Self {
        CheckoutRequest { items: body.items, address: body.address, contact: body.contact }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    #[serde(rename = "paymentURL")]
    pub payment_url: String,
}

//----------------------------------------------   Orders  ----------------------------------------------------
/// Query parameters for the order listing. Everything arrives as text so that bad paging values can fall back to the
/// defaults instead of failing the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl OrdersQuery {
    pub fn filter(&self) -> Result<OrderQueryFilter, ServerError> {
        match self.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => Ok(OrderQueryFilter::default()),
            Some(s) => {
                let status = s
                    .parse::<OrderStatusType>()
                    .map_err(|_| ServerError::InvalidRequestBody(format!("'{s}' is not a valid order status")))?;
                Ok(OrderQueryFilter::default().with_status(status))
            },
        }
    }

    pub fn pagination(&self) -> Pagination {
        let limit = self.limit.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        let offset = self.offset.as_deref().and_then(|s| s.trim().parse::<i64>().ok());
        Pagination::new(limit, offset)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub new_status: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderUpdateRequest {
    pub message: String,
}
