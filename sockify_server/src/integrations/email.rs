use std::fmt::Debug;

use log::*;
use reqwest::Client;
use serde::Serialize;
use sockify_engine::{
    db_types::Contact,
    order_objects::OrderConfirmation,
    traits::{NotificationError, NotificationSink},
};

use crate::{
    config::EmailConfig,
    integrations::email_templates::{
        order_confirmation_html,
        order_confirmation_subject,
        order_confirmation_text,
        EMAIL_SENDER_NAME,
    },
};

/// Sends order confirmations through the SendGrid v3 API. Without an API key it only logs them.
#[derive(Clone)]
pub struct EmailNotifier {
    config: EmailConfig,
    client: Client,
}

impl Debug for EmailNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EmailNotifier ({}, enabled: {})", self.config.sendgrid_api_url, self.config.is_enabled())
    }
}

impl EmailNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config, client: Client::new() }
    }

    fn url(&self) -> String {
        format!("{}/v3/mail/send", self.config.sendgrid_api_url.trim_end_matches('/'))
    }
}

impl NotificationSink for EmailNotifier {
    async fn send_order_confirmation(
        &self,
        recipient: &Contact,
        confirmation: &OrderConfirmation,
    ) -> Result<(), NotificationError> {
        let mail = SendGridMail::order_confirmation(&self.config.sender_address, recipient, confirmation);
        if !self.config.is_enabled() {
            info!(
                "📧️ E-mail is not configured. Confirmation for {} to {} was not sent.\n{}",
                confirmation.invoice_number,
                recipient.email,
                order_confirmation_text(confirmation)
            );
            return Ok(());
        }
        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.config.sendgrid_api_key.reveal())
            .json(&mail)
            .send()
            .await
            .map_err(|e| NotificationError(format!("Could not reach SendGrid. {e}")))?;
        let status = response.status();
        if status.is_success() {
            info!("📧️ Sent order confirmation for invoice {}", confirmation.invoice_number);
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!("📧️ SendGrid rejected the confirmation for invoice {}. {status}", confirmation.invoice_number);
            Err(NotificationError(format!("SendGrid answered {status}. {body}")))
        }
    }
}

//--------------------------------------    SendGrid payload   ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct EmailAddress {
    email: String,
    name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Personalization {
    to: Vec<EmailAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct MailContent {
    #[serde(rename = "type")]
    content_type: &'static str,
    value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct SendGridMail {
    personalizations: Vec<Personalization>,
    from: EmailAddress,
    subject: String,
    content: Vec<MailContent>,
}

impl SendGridMail {
    fn order_confirmation(sender: &str, recipient: &Contact, confirmation: &OrderConfirmation) -> Self {
        let to = EmailAddress { email: recipient.email.clone(), name: recipient.full_name() };
        Self {
            personalizations: vec![Personalization { to: vec![to] }],
            from: EmailAddress { email: sender.to_string(), name: EMAIL_SENDER_NAME.to_string() },
            subject: order_confirmation_subject(confirmation),
            // SendGrid wants text/plain before text/html
            content: vec![
                MailContent { content_type: "text/plain", value: order_confirmation_text(confirmation) },
                MailContent { content_type: "text/html", value: order_confirmation_html(confirmation) },
            ],
        }
    }
}
