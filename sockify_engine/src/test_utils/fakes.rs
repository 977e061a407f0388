//! In-memory stand-ins for the payment processor and the mailer.
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
        Mutex,
        MutexGuard,
    },
};

use crate::{
    db_types::Contact,
    order_objects::OrderConfirmation,
    traits::{
        CheckoutSessionRequest,
        NotificationError,
        NotificationSink,
        PaymentGateway,
        PaymentGatewayError,
        PaymentSession,
        PaymentSessionStatus,
    },
};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A payment processor that keeps its sessions in memory. Tests move sessions between states with
/// [`FakePaymentGateway::set_status`]. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct FakePaymentGateway {
    sessions: Arc<Mutex<HashMap<String, PaymentSession>>>,
    requests: Arc<Mutex<Vec<CheckoutSessionRequest>>>,
    counter: Arc<AtomicU64>,
    fail_creation: Arc<AtomicBool>,
    omit_url: Arc<AtomicBool>,
}

impl FakePaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent session creation fail with [`PaymentGatewayError::Unavailable`].
    pub fn fail_session_creation(&self, fail: bool) {
        self.fail_creation.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent sessions come back without a payment URL.
    pub fn omit_payment_url(&self, omit: bool) {
        self.omit_url.store(omit, Ordering::SeqCst);
    }

    pub fn set_status(&self, session_id: &str, status: PaymentSessionStatus) {
        if let Some(session) = lock(&self.sessions).get_mut(session_id) {
            session.status = status;
        }
    }

    /// Adds a session directly, bypassing checkout. Handy for malformed metadata.
    pub fn insert_session(&self, session: PaymentSession) {
        lock(&self.sessions).insert(session.id.clone(), session);
    }

    pub fn session_for_order(&self, order_id: i64) -> Option<String> {
        let order_id = order_id.to_string();
        lock(&self.sessions).values().find(|s| s.order_id() == Some(order_id.as_str())).map(|s| s.id.clone())
    }

    pub fn requests(&self) -> Vec<CheckoutSessionRequest> {
        lock(&self.requests).clone()
    }

    pub fn last_request(&self) -> Option<CheckoutSessionRequest> {
        lock(&self.requests).last().cloned()
    }
}

impl PaymentGateway for FakePaymentGateway {
    async fn create_checkout_session(
        &self,
        request: &CheckoutSessionRequest,
    ) -> Result<PaymentSession, PaymentGatewayError> {
        lock(&self.requests).push(request.clone());
        if self.fail_creation.load(Ordering::SeqCst) {
            return Err(PaymentGatewayError::Unavailable("The fake gateway is switched off".into()));
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("cs_test_{n:04}");
        let url = (!self.omit_url.load(Ordering::SeqCst)).then(|| format!("https://checkout.test/pay/{id}"));
        let session = PaymentSession {
            id: id.clone(),
            url,
            status: PaymentSessionStatus::Open,
            metadata: request.metadata.clone(),
        };
        lock(&self.sessions).insert(id, session.clone());
        Ok(session)
    }

    async fn fetch_checkout_session(&self, session_id: &str) -> Result<Option<PaymentSession>, PaymentGatewayError> {
        Ok(lock(&self.sessions).get(session_id).cloned())
    }
}

/// Records every confirmation it is asked to send.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(Contact, OrderConfirmation)>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliveries still get recorded, but report failure.
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(Contact, OrderConfirmation)> {
        lock(&self.sent).clone()
    }

    pub fn sent_count(&self) -> usize {
        lock(&self.sent).len()
    }
}

impl NotificationSink for RecordingNotifier {
    async fn send_order_confirmation(
        &self,
        recipient: &Contact,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotificationError> {
        lock(&self.sent).push((recipient.clone(), confirmation.clone()));
        if self.fail.load(Ordering::SeqCst) {
            return Err(NotificationError("The fake mailer is switched off".into()));
        }
        Ok(())
    }
}
