use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
pub use sockify_common::Cents;
use sqlx::{sqlite::SqliteRow, FromRow, Row, Type};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error)]
#[error("Conversion error: {0}")]
pub struct ConversionError(String);

//--------------------------------------       SockSize        ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
pub enum SockSize {
    #[sqlx(rename = "S")]
    #[serde(rename = "S")]
    Small,
    #[sqlx(rename = "M")]
    #[serde(rename = "M")]
    Medium,
    #[sqlx(rename = "LG")]
    #[serde(rename = "LG")]
    Large,
    #[sqlx(rename = "XL")]
    #[serde(rename = "XL")]
    ExtraLarge,
}

impl Display for SockSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SockSize::Small => write!(f, "S"),
            SockSize::Medium => write!(f, "M"),
            SockSize::Large => write!(f, "LG"),
            SockSize::ExtraLarge => write!(f, "XL"),
        }
    }
}

impl FromStr for SockSize {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "S" => Ok(Self::Small),
            "M" => Ok(Self::Medium),
            "LG" => Ok(Self::Large),
            "XL" => Ok(Self::ExtraLarge),
            s => Err(ConversionError(format!("Invalid sock size: {s}"))),
        }
    }
}

//--------------------------------------     SockVariant       ---------------------------------------------------------
/// A purchasable size of a sock. `quantity` is the stock currently available for checkout.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SockVariant {
    #[sqlx(rename = "sock_variant_id")]
    pub id: i64,
    pub sock_id: i64,
    pub sock_name: String,
    pub size: SockSize,
    pub price: Cents,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------   OrderStatusType     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been placed and is awaiting fulfilment. Every order starts here.
    Received,
    /// The order has left the warehouse.
    Shipped,
    /// The order was canceled before it shipped.
    Canceled,
    /// The customer has received the order.
    Delivered,
    /// The customer sent the order back.
    Returned,
}

impl OrderStatusType {
    pub const ALL: [OrderStatusType; 5] = [
        OrderStatusType::Received,
        OrderStatusType::Shipped,
        OrderStatusType::Canceled,
        OrderStatusType::Delivered,
        OrderStatusType::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatusType::Received => "received",
            OrderStatusType::Shipped => "shipped",
            OrderStatusType::Canceled => "canceled",
            OrderStatusType::Delivered => "delivered",
            OrderStatusType::Returned => "returned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Canceled | OrderStatusType::Returned)
    }
}

impl Default for OrderStatusType {
    fn default() -> Self {
        Self::Received
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "received" => Ok(Self::Received),
            "shipped" => Ok(Self::Shipped),
            "canceled" => Ok(Self::Canceled),
            "delivered" => Ok(Self::Delivered),
            "returned" => Ok(Self::Returned),
            _ => Err(ConversionError(format!("Invalid order status: '{s}'"))),
        }
    }
}

//--------------------------------------    InvoiceNumber      ---------------------------------------------------------
/// The customer-facing order identifier. Generated once when the order is created and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct InvoiceNumber(String);

impl InvoiceNumber {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for InvoiceNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for InvoiceNumber {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------       Address         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    #[serde(default)]
    pub apt_unit: Option<String>,
    pub state: String,
    pub zipcode: String,
}

impl Address {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("street", &self.street)?;
        require("state", &self.state)?;
        require("zipcode", &self.zipcode)?;
        Ok(())
    }

    /// Blank apartment/unit strings are stored as NULL.
    pub fn normalized(mut self) -> Self {
        self.apt_unit = self.apt_unit.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        self
    }
}

//--------------------------------------       Contact         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Contact {
    #[serde(alias = "firstName")]
    pub firstname: String,
    #[serde(alias = "lastName")]
    pub lastname: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require("firstname", &self.firstname)?;
        require("lastname", &self.lastname)?;
        require("email", &self.email)?;
        require("phone", &self.phone)?;
        if !self.email.contains('@') {
            return Err(ValidationError(format!("'{}' is not a valid email address", self.email)));
        }
        Ok(())
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid request. {0}")]
pub struct ValidationError(pub String);

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError(format!("The {field} field is required")))
    } else {
        Ok(())
    }
}

//--------------------------------------        Actor          ---------------------------------------------------------
/// Who is responsible for a change to an order. System changes (payment settlement) have no admin attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Admin(i64),
    System,
}

impl Actor {
    pub fn admin_id(&self) -> Option<i64> {
        match self {
            Actor::Admin(id) => Some(*id),
            Actor::System => None,
        }
    }
}

impl Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Admin(id) => write!(f, "admin #{id}"),
            Actor::System => write!(f, "system"),
        }
    }
}

//--------------------------------------      NewOrder         ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub sock_variant_id: i64,
    pub name: String,
    pub size: SockSize,
    pub price: Cents,
    pub quantity: i64,
}

impl NewOrderItem {
    pub fn subtotal(&self) -> Cents {
        self.price * self.quantity
    }
}

/// An order that has not been persisted yet. The total is always derived from the item snapshots.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub invoice_number: InvoiceNumber,
    pub address: Address,
    pub contact: Contact,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn new(address: Address, contact: Contact, items: Vec<NewOrderItem>) -> Self {
        Self { invoice_number: InvoiceNumber::generate(), address: address.normalized(), contact, items }
    }

    pub fn total_price(&self) -> Cents {
        self.items.iter().map(NewOrderItem::subtotal).sum()
    }
}

//--------------------------------------      OrderItem        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[sqlx(rename = "order_item_id")]
    #[serde(skip)]
    pub id: i64,
    #[serde(skip)]
    pub order_id: i64,
    pub sock_variant_id: i64,
    pub name: String,
    pub size: SockSize,
    pub price: Cents,
    pub quantity: i64,
}

//--------------------------------------        Order          ---------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderId")]
    pub id: i64,
    pub invoice_number: InvoiceNumber,
    pub total: Cents,
    pub status: OrderStatusType,
    pub address: Address,
    pub contact: Contact,
    pub items: Vec<OrderItem>,
    pub payment_confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn is_paid(&self) -> bool {
        self.payment_confirmed_at.is_some()
    }
}

impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let address = Address {
            street: row.try_get("street")?,
            apt_unit: row.try_get("apt_unit")?,
            state: row.try_get("state")?,
            zipcode: row.try_get("zipcode")?,
        };
        let contact = Contact {
            firstname: row.try_get("firstname")?,
            lastname: row.try_get("lastname")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
        };
        Ok(Self {
            id: row.try_get("order_id")?,
            invoice_number: row.try_get("invoice_number")?,
            total: row.try_get("total_price")?,
            status: row.try_get("status")?,
            address,
            contact,
            items: Vec::new(),
            payment_confirmed_at: row.try_get("payment_confirmed_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

//--------------------------------------     OrderUpdate       ---------------------------------------------------------
/// The admin an audit entry is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAuthor {
    #[serde(skip)]
    pub admin_id: i64,
    pub firstname: String,
    pub lastname: String,
    pub username: String,
}

/// One row of an order's append-only audit trail. `created_by` is `None` for system-initiated changes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub id: i64,
    #[serde(skip)]
    pub order_id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<UpdateAuthor>,
}

impl OrderUpdate {
    pub fn actor(&self) -> Actor {
        match &self.created_by {
            Some(author) => Actor::Admin(author.admin_id),
            None => Actor::System,
        }
    }
}

impl FromRow<'_, SqliteRow> for OrderUpdate {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let admin_id: Option<i64> = row.try_get("admin_id")?;
        let created_by = match admin_id {
            Some(admin_id) => Some(UpdateAuthor {
                admin_id,
                firstname: row.try_get::<Option<String>, _>("firstname")?.unwrap_or_default(),
                lastname: row.try_get::<Option<String>, _>("lastname")?.unwrap_or_default(),
                username: row.try_get::<Option<String>, _>("username")?.unwrap_or_default(),
            }),
            None => None,
        };
        Ok(Self {
            id: row.try_get("order_update_id")?,
            order_id: row.try_get("order_id")?,
            message: row.try_get("message")?,
            created_at: row.try_get("created_at")?,
            created_by,
        })
    }
}
