use std::{collections::HashMap, fmt::Debug};

use chrono::Utc;
use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderStatusType},
    engine_api::{
        checkout_objects::{CheckoutConfig, CheckoutRequest, CheckoutResult},
        errors::CheckoutError,
        order_objects::OrderConfirmation,
    },
    helpers::{merge_cart_lines, price_cart_lines},
    status_machine::{validate_transition, StatusTransitionError},
    traits::{
        CheckoutDatabase,
        CheckoutSessionRequest,
        NotificationSink,
        PaymentGateway,
        PaymentGatewayError,
        PaymentOutcome,
        PaymentSession,
        PaymentSessionStatus,
        SessionLineItem,
        Settlement,
        ORDER_ID_METADATA_KEY,
    },
};

pub const SESSION_CREATION_FAILED_MESSAGE: &str = "Payment session could not be created. Order canceled";

/// `CheckoutApi` turns a cart into a paid (or canceled) order.
///
/// It validates the cart, creates the order and reserves its stock in one transaction, opens a hosted payment session
/// with the [`PaymentGateway`] and, once the customer returns, settles the order according to the session status.
pub struct CheckoutApi<B, G, N> {
    db: B,
    gateway: G,
    notifier: N,
    config: CheckoutConfig,
}

impl<B, G, N> Debug for CheckoutApi<B, G, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CheckoutApi ({})", self.config.currency)
    }
}

impl<B, G, N> CheckoutApi<B, G, N> {
    pub fn new(db: B, gateway: G, notifier: N, config: CheckoutConfig) -> Self {
        Self { db, gateway, notifier, config }
    }

    pub fn db(&self) -> &B {
        &self.db
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn config(&self) -> &CheckoutConfig {
        &self.config
    }
}

impl<B, G, N> CheckoutApi<B, G, N>
where
    B: CheckoutDatabase,
    G: PaymentGateway,
    N: NotificationSink,
{
    /// Places an order for the cart and returns the URL of the hosted payment page.
    ///
    /// Prices always come from the inventory, never from the caller. The order is left in `received` and unpaid
    /// until [`Self::confirm_payment`] is called for the session.
    pub async fn checkout(&self, request: CheckoutRequest) -> Result<CheckoutResult, CheckoutError> {
        let lines = merge_cart_lines(&request.items)?;
        request.address.validate()?;
        request.contact.validate()?;
        let ids = lines.iter().map(|l| l.sock_variant_id).collect::<Vec<i64>>();
        let variants = self.db.fetch_variants_by_ids(&ids).await?;
        let items = price_cart_lines(&lines, &variants)?;
        let new_order = NewOrder::new(request.address, request.contact, items);
        trace!("🛒️ Placing order {} for {} variants", new_order.invoice_number, ids.len());
        let order = self.db.insert_order(new_order).await?;
        info!("🛒️ Order #{} [{}] created. Total {}", order.id, order.invoice_number, order.total);

        let session_request = self.session_request_for(&order);
        let session = self.gateway.create_checkout_session(&session_request).await.and_then(|session| {
            match session.url {
                Some(url) => Ok(url),
                None => Err(PaymentGatewayError::InvalidResponse(format!(
                    "Checkout session {} was created without a payment URL",
                    session.id
                ))),
            }
        });
        match session {
            Ok(payment_url) => {
                debug!("🛒️ Payment session created for order #{}", order.id);
                Ok(CheckoutResult { order_id: order.id, invoice_number: order.invoice_number, payment_url })
            },
            Err(e) => {
                error!("🛒️ Could not create a payment session for order #{}. {e}", order.id);
                self.release_abandoned_order(order.id).await;
                Err(e.into())
            },
        }
    }

    /// Settles the order attached to the payment session `session_id` and returns its confirmation summary.
    ///
    /// * An open session leaves the order untouched and fails with [`CheckoutError::PaymentPending`].
    /// * A complete session records the payment. The confirmation e-mail is sent the first time only.
    /// * An expired session cancels the order, restocks its items and fails with [`CheckoutError::PaymentIncomplete`].
    ///
    /// Calling this more than once for the same session is safe.
    pub async fn confirm_payment(&self, session_id: &str) -> Result<OrderConfirmation, CheckoutError> {
        let session_id = session_id.trim();
        if session_id.is_empty() {
            return Err(CheckoutError::MissingSessionId);
        }
        let session = self.gateway.fetch_checkout_session(session_id).await?.ok_or(CheckoutError::MissingSessionId)?;
        let order_id = order_id_from_session(&session)?;
        let order = self.fetch_order(order_id).await?;
        trace!("🛒️ Session {session_id} is '{}'. Order #{order_id} is '{}'", session.status, order.status);
        match &session.status {
            PaymentSessionStatus::Open => {
                debug!("🛒️ Payment for order #{order_id} is still pending");
                Err(CheckoutError::PaymentPending)
            },
            PaymentSessionStatus::Complete => self.settle_paid_order(&order, session_id).await,
            PaymentSessionStatus::Expired => self.settle_expired_order(&order, session_id).await,
            PaymentSessionStatus::Other(status) => {
                warn!("🛒️ Session {session_id} for order #{order_id} has an unexpected status: {status}");
                Err(CheckoutError::UnexpectedSessionStatus(status.clone()))
            },
        }
    }

    async fn settle_paid_order(&self, order: &Order, session_id: &str) -> Result<OrderConfirmation, CheckoutError> {
        let settlement = if order.is_paid() {
            Settlement::AlreadySettled
        } else {
            if order.status != OrderStatusType::Received {
                return Err(StatusTransitionError::IllegalTransition {
                    from: order.status,
                    to: OrderStatusType::Received.to_string(),
                }
                .into());
            }
            let message = format!("Payment confirmed (checkout session {session_id})");
            self.db.settle_payment(order.id, PaymentOutcome::Paid, &message).await?
        };
        let order = self.fetch_order(order.id).await?;
        let confirmation = OrderConfirmation::from(&order);
        match settlement {
            Settlement::Applied => {
                info!("🛒️ Payment for order #{} confirmed", order.id);
                if let Err(e) = self.notifier.send_order_confirmation(&order.contact, &confirmation).await {
                    warn!("🛒️ Order #{} is confirmed, but the confirmation could not be sent. {e}", order.id);
                }
            },
            Settlement::AlreadySettled => {
                debug!("🛒️ Payment for order #{} was already confirmed. Not notifying again", order.id);
            },
        }
        Ok(confirmation)
    }

    async fn settle_expired_order(&self, order: &Order, session_id: &str) -> Result<OrderConfirmation, CheckoutError> {
        if order.is_paid() {
            return Err(CheckoutError::PaymentAlreadyConfirmed(order.id));
        }
        if order.status != OrderStatusType::Canceled {
            validate_transition(order.status, OrderStatusType::Canceled)?;
        }
        let message = format!("Checkout session {session_id} expired. Order canceled");
        let settlement = self.db.settle_payment(order.id, PaymentOutcome::Expired, &message).await?;
        if settlement.was_applied() {
            info!("🛒️ Payment session for order #{} expired. The order was canceled", order.id);
        }
        Err(CheckoutError::PaymentIncomplete)
    }

    async fn release_abandoned_order(&self, order_id: i64) {
        match self.db.settle_payment(order_id, PaymentOutcome::Expired, SESSION_CREATION_FAILED_MESSAGE).await {
            Ok(_) => info!("🛒️ Order #{order_id} canceled and its stock released"),
            Err(e) => error!("🛒️ Could not cancel order #{order_id} after the payment session failed. {e}"),
        }
    }

    async fn fetch_order(&self, order_id: i64) -> Result<Order, CheckoutError> {
        self.db.fetch_order_by_id(order_id).await?.ok_or(CheckoutError::OrderNotFound(order_id))
    }

    fn session_request_for(&self, order: &Order) -> CheckoutSessionRequest {
        let line_items = order
            .items
            .iter()
            .map(|item| SessionLineItem {
                name: item.name.clone(),
                description: format!("Size: {}", item.size),
                unit_amount: item.price,
                quantity: item.quantity,
            })
            .collect();
        let metadata = HashMap::from([(ORDER_ID_METADATA_KEY.to_string(), order.id.to_string())]);
        CheckoutSessionRequest {
            currency: self.config.currency.clone(),
            line_items,
            success_url: self.config.success_url.clone(),
            cancel_url: self.config.cancel_url.clone(),
            expires_at: Utc::now() + self.config.session_ttl,
            metadata,
        }
    }
}

fn order_id_from_session(session: &PaymentSession) -> Result<i64, CheckoutError> {
    let raw = session.order_id().ok_or_else(|| {
        CheckoutError::InvalidSessionMetadata(format!("Session {} carries no '{ORDER_ID_METADATA_KEY}'", session.id))
    })?;
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CheckoutError::InvalidSessionMetadata(format!("'{raw}' is not a valid order id")))
}
