use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client,
    Method,
    StatusCode,
};
use serde::de::DeserializeOwned;

use crate::{
    helpers::{checkout_session_form, is_valid_session_id},
    CheckoutSession,
    NewCheckoutSession,
    StripeApiError,
    StripeConfig,
};

#[derive(Clone)]
pub struct StripeApi {
    config: StripeConfig,
    client: Arc<Client>,
}

impl std::fmt::Debug for StripeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "StripeApi ({})", self.config.api_url)
    }
}

impl StripeApi {
    pub fn new(config: StripeConfig) -> Result<Self, StripeApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        let mut val = HeaderValue::from_str(&format!("Bearer {}", config.secret_key.reveal()))
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        val.set_sensitive(true);
        headers.insert(AUTHORIZATION, val);
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| StripeApiError::Initialization(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/v1{path}", self.config.api_url.trim_end_matches('/'))
    }

    /// Sends a request to the Stripe API. Stripe takes form-encoded bodies and answers with JSON.
    ///
    /// Returns `Ok(None)` if Stripe answers 404.
    pub async fn rest_query<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Option<&[(String, String)]>,
    ) -> Result<Option<T>, StripeApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req = self.client.request(method, url);
        if let Some(form) = form {
            req = req.form(form);
        }
        let response = req.send().await.map_err(|e| StripeApiError::RestRequestError(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            trace!("💳️ REST query successful. {status}");
            let result = response.json::<T>().await.map_err(|e| StripeApiError::JsonError(e.to_string()))?;
            Ok(Some(result))
        } else if status == StatusCode::NOT_FOUND {
            debug!("💳️ Stripe could not find {path}");
            Ok(None)
        } else {
            let message = response.text().await.map_err(|e| StripeApiError::RestResponseError(e.to_string()))?;
            Err(StripeApiError::QueryError { status: status.as_u16(), message })
        }
    }

    pub async fn create_checkout_session(
        &self,
        session: &NewCheckoutSession,
    ) -> Result<CheckoutSession, StripeApiError> {
        let form = checkout_session_form(session);
        debug!("💳️ Creating checkout session with {} line items", session.line_items.len());
        let result = self.rest_query::<CheckoutSession>(Method::POST, "/checkout/sessions", Some(&form)).await?;
        let session = result.ok_or_else(|| StripeApiError::RestResponseError("Stripe answered 404".into()))?;
        info!("💳️ Created checkout session {}", session.id);
        Ok(session)
    }

    pub async fn fetch_checkout_session(&self, session_id: &str) -> Result<Option<CheckoutSession>, StripeApiError> {
        if !is_valid_session_id(session_id) {
            warn!("💳️ Refusing to look up malformed checkout session id {session_id:?}");
            return Ok(None);
        }
        let path = format!("/checkout/sessions/{session_id}");
        debug!("💳️ Fetching checkout session {session_id}");
        self.rest_query::<CheckoutSession>(Method::GET, &path, None).await
    }
}
