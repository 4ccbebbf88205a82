//! WhatsApp delivery through the Twilio Messages API.
//!
//! One notice becomes one outbound WhatsApp message to the host's number.
//! Delivery failures surface to the handoff endpoint as `NotifyError`; the
//! chat path itself never calls into this module.

use async_trait::async_trait;
use innkeep_core::error::NotifyError;
use innkeep_core::notify::{HandoffNotice, Notifier};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};

const TWILIO_API_BASE: &str = "https://api.twilio.com";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Twilio WhatsApp gateway.
pub struct WhatsAppNotifier {
    base_url: String,
    account_sid: String,
    auth_token: String,
    /// Sender in `whatsapp:+41...` form
    from_number: String,
    /// The host's number in `whatsapp:+41...` form
    to_number: String,
    client: reqwest::Client,
}

impl WhatsAppNotifier {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from_number: impl Into<String>,
        to_number: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let account_sid = account_sid.into();
        let auth_token = auth_token.into();
        if account_sid.is_empty() || auth_token.is_empty() {
            return Err(NotifyError::NotConfigured(
                "Twilio credentials not set".to_string(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        Ok(Self {
            base_url: TWILIO_API_BASE.to_string(),
            account_sid,
            auth_token,
            from_number: whatsapp_address(from_number.into()),
            to_number: whatsapp_address(to_number.into()),
            client,
        })
    }

    /// Override the API base URL (for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Normalize a number to Twilio's `whatsapp:` addressing scheme.
fn whatsapp_address(number: String) -> String {
    if number.starts_with("whatsapp:") {
        number
    } else {
        format!("whatsapp:{number}")
    }
}

/// The message body shown to the host.
fn format_notice(notice: &HandoffNotice) -> String {
    let mut body = format!(
        "🛎️ Guest handoff request\n\nFrom: {name}",
        name = notice.guest_name
    );
    if let Some(contact) = notice.guest_contact.as_deref() {
        body.push_str(&format!("\nContact: {contact}"));
    }
    if let Some(apartment) = notice.apartment {
        body.push_str(&format!("\nApartment: Unit {}", apartment.number()));
    }
    body.push_str(&format!("\n\nQuestion:\n{}", notice.question));
    if let Some(summary) = notice.summary.as_deref() {
        body.push_str(&format!("\n\nConversation so far:\n{summary}"));
    }
    body
}

#[async_trait]
impl Notifier for WhatsAppNotifier {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotifyError> {
        let body = format_notice(notice);
        debug!(to = %self.to_number, "sending handoff notice");

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        let params = [
            ("From", self.from_number.as_str()),
            ("To", self.to_number.as_str()),
            ("Body", body.as_str()),
        ];

        let response = self
            .client
            .post(url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(NotifyError::DeliveryFailed(format!(
                "Twilio returned {status}: {detail}"
            )));
        }

        info!(guest = %notice.guest_name, "handoff notice delivered");
        Ok(())
    }
}

impl fmt::Debug for WhatsAppNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WhatsAppNotifier")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"[REDACTED]")
            .field("from_number", &self.from_number)
            .field("to_number", &self.to_number)
            .finish()
    }
}

/// Gateway for deployments without a configured handoff channel. Logs the
/// notice and reports the channel as unconfigured.
#[derive(Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotifyError> {
        info!(guest = %notice.guest_name, "handoff requested but no gateway is configured");
        Err(NotifyError::NotConfigured(
            "no notification gateway configured".to_string(),
        ))
    }
}
