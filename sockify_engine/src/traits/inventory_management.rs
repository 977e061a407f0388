use thiserror::Error;

use crate::db_types::SockVariant;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Sock variant {0} does not exist")]
    VariantNotFound(i64),
    #[error("Sock variant {variant_id} is out of stock. Requested {requested}, but only {available} available")]
    InsufficientStock { variant_id: i64, requested: i64, available: i64 },
    #[error("Invalid quantity for sock variant {variant_id}: {quantity}")]
    InvalidQuantity { variant_id: i64, quantity: i64 },
}

impl From<sqlx::Error> for InventoryError {
    fn from(e: sqlx::Error) -> Self {
        InventoryError::DatabaseError(e.to_string())
    }
}

/// The Inventory Ledger. Backends own the stock levels of every sock variant and are the sole arbiter of how many
/// units are left.
///
/// Stock is only ever taken with a conditional decrement (`quantity >= requested`), evaluated by the store itself.
/// Implementations must never read the quantity, compare in application code and write the difference back, since
/// two concurrent checkouts would both pass the comparison.
#[allow(async_fn_in_trait)]
pub trait InventoryManagement {
    /// Fetches the current records for the given variant ids in one round trip. Unknown ids are simply absent from
    /// the result.
    async fn fetch_variants_by_ids(&self, ids: &[i64]) -> Result<Vec<SockVariant>, InventoryError>;

    async fn fetch_variant(&self, id: i64) -> Result<Option<SockVariant>, InventoryError>;

    /// Atomically takes `quantity` units of the variant out of stock, returning the updated record.
    ///
    /// Fails with [`InventoryError::InsufficientStock`] if fewer than `quantity` units are available, and with
    /// [`InventoryError::VariantNotFound`] if the variant does not exist. Nothing changes on failure.
    async fn reserve_stock(&self, variant_id: i64, quantity: i64) -> Result<SockVariant, InventoryError>;

    /// Puts `quantity` units back into stock.
    async fn release_stock(&self, variant_id: i64, quantity: i64) -> Result<SockVariant, InventoryError>;
}
