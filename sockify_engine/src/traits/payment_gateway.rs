use thiserror::Error;

use crate::traits::data_objects::{CheckoutSessionRequest, PaymentSession};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentGatewayError {
    #[error("The payment gateway could not be reached. {0}")]
    Unavailable(String),
    #[error("The payment gateway rejected the request. {0}")]
    Rejected(String),
    #[error("The payment gateway sent an unexpected response. {0}")]
    InvalidResponse(String),
}

/// An external payment processor that hosts checkout pages.
///
/// Session expiry is governed by the processor's clock. The engine only reacts to the status it reports.
#[allow(async_fn_in_trait)]
pub trait PaymentGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<PaymentSession, PaymentGatewayError>;

    /// Looks up a session by id. Returns `None` if the processor does not know the session.
    async fn fetch_checkout_session(&self, session_id: &str) -> Result<Option<PaymentSession>, PaymentGatewayError>;
}
