use thiserror::Error;

use crate::{db_types::Contact, order_objects::OrderConfirmation};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not deliver notification. {0}")]
pub struct NotificationError(pub String);

/// Delivers order confirmations to customers. Delivery failures are reported but never undo the confirmation.
#[allow(async_fn_in_trait)]
pub trait NotificationSink {
    async fn send_order_confirmation(
        &self,
        recipient: &Contact,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotificationError>;
}
