use log::*;
use sockify_engine::traits::{
    CheckoutSessionRequest,
    PaymentGateway,
    PaymentGatewayError,
    PaymentSession,
    PaymentSessionStatus,
};
use stripe_tools::{CheckoutSession, NewCheckoutSession, NewLineItem, StripeApi, StripeApiError, StripeConfig};

/// [`PaymentGateway`] backed by Stripe Checkout.
#[derive(Debug, Clone)]
pub struct StripeGateway {
    api: StripeApi,
}

impl StripeGateway {
    pub fn new(api: StripeApi) -> Self {
        Self { api }
    }

    pub fn from_config(config: StripeConfig) -> Result<Self, StripeApiError> {
        let api = StripeApi::new(config)?;
        Ok(Self::new(api))
    }
}

impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<PaymentSession, PaymentGatewayError> {
        let session = new_checkout_session(request);
        let session = self.api.create_checkout_session(&session).await.map_err(|e| {
            warn!("💳️ Stripe could not create a checkout session for order {:?}. {e}", request.order_id());
            gateway_error(e)
        })?;
        Ok(payment_session(session))
    }

    async fn fetch_checkout_session(&self, session_id: &str) -> Result<Option<PaymentSession>, PaymentGatewayError> {
        let session = self.api.fetch_checkout_session(session_id).await.map_err(|e| {
            warn!("💳️ Could not fetch checkout session {session_id}. {e}");
            gateway_error(e)
        })?;
        Ok(session.map(payment_session))
    }
}

fn new_checkout_session(request: &CheckoutSessionRequest) -> NewCheckoutSession {
    let line_items = request
        .line_items
        .iter()
        .map(|item| NewLineItem {
            name: item.name.clone(),
            description: item.description.clone(),
            unit_amount: item.unit_amount.value(),
            quantity: item.quantity,
        })
        .collect();
    NewCheckoutSession {
        currency: request.currency.clone(),
        line_items,
        success_url: request.success_url.clone(),
        cancel_url: request.cancel_url.clone(),
        expires_at: request.expires_at,
        metadata: request.metadata.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
    }
}

fn payment_session(session: CheckoutSession) -> PaymentSession {
    let status = PaymentSessionStatus::from(session.status.as_deref().unwrap_or_default());
    PaymentSession { id: session.id, url: session.url, status, metadata: session.metadata.into_iter().collect() }
}

fn gateway_error(e: StripeApiError) -> PaymentGatewayError {
    match e {
        StripeApiError::Initialization(s) | StripeApiError::RestRequestError(s) => PaymentGatewayError::Unavailable(s),
        StripeApiError::QueryError { status, message } if status >= 500 => {
            PaymentGatewayError::Unavailable(format!("Stripe answered {status}. {message}"))
        },
        StripeApiError::QueryError { status, message } => {
            PaymentGatewayError::Rejected(format!("Stripe answered {status}. {message}"))
        },
        StripeApiError::RestResponseError(s) | StripeApiError::JsonError(s) => PaymentGatewayError::InvalidResponse(s),
    }
}
