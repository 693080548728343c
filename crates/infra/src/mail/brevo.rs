use std::time::Duration;

use serde::Serialize;
use tracing::instrument;

use backoffice_auth::{MailError, Mailer};

use super::{
    ACTIVATION_SUBJECT, ACTIVATION_SUCCESS_SUBJECT, activation_html, activation_link,
    activation_success_text, activation_text,
};

const BREVO_SEND_URL: &str = "https://api.brevo.com/v3/smtp/email";

#[derive(Clone)]
pub struct BrevoSettings {
    pub api_key: String,
    pub sender_email: String,
    pub sender_name: Option<String>,
    /// Base URL used to build activation links.
    pub backend_url: String,
}

impl core::fmt::Debug for BrevoSettings {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BrevoSettings")
            .field("api_key", &"<redacted>")
            .field("sender_email", &self.sender_email)
            .field("sender_name", &self.sender_name)
            .field("backend_url", &self.backend_url)
            .finish()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoEmailAddress {
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BrevoSendEmailBody {
    sender: BrevoEmailAddress,
    to: Vec<BrevoEmailAddress>,
    subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    html_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text_content: Option<String>,
}

/// Sends transactional mail through Brevo.
#[derive(Debug, Clone)]
pub struct BrevoMailer {
    client: reqwest::Client,
    settings: BrevoSettings,
    endpoint: String,
}

impl BrevoMailer {
    pub fn new(settings: BrevoSettings) -> Result<Self, MailError> {
        if settings.api_key.trim().is_empty() {
            return Err(MailError::Configuration("BREVO_API_KEY is required".into()));
        }
        if settings.sender_email.trim().is_empty() {
            return Err(MailError::Configuration(
                "BREVO_SENDER_EMAIL is required".into(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| MailError::Configuration(format!("http client: {e}")))?;
        Ok(Self {
            client,
            settings,
            endpoint: BREVO_SEND_URL.to_string(),
        })
    }

    /// Point the mailer at a different API root (used against local fakes).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn body(
        &self,
        to_email: &str,
        subject: &str,
        html: Option<String>,
        text: Option<String>,
    ) -> BrevoSendEmailBody {
        BrevoSendEmailBody {
            sender: BrevoEmailAddress {
                email: self.settings.sender_email.clone(),
                name: self.settings.sender_name.clone(),
            },
            to: vec![BrevoEmailAddress {
                email: to_email.to_string(),
                name: None,
            }],
            subject: subject.to_string(),
            html_content: html,
            text_content: text,
        }
    }

    async fn send(&self, body: BrevoSendEmailBody) -> Result<(), MailError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .header("api-key", &self.settings.api_key)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Delivery(format!("Brevo request failed: {e}")))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let detail = resp.text().await.unwrap_or_default();
        Err(MailError::Delivery(format!(
            "Brevo send failed (status={}): {}",
            status.as_u16(),
            detail
        )))
    }
}

#[async_trait::async_trait]
impl Mailer for BrevoMailer {
    #[instrument(skip(self, activation_token), err)]
    async fn send_activation_email(&self, email: &str, activation_token: &str) -> Result<(), MailError> {
        let link = activation_link(&self.settings.backend_url, activation_token);
        let body = self.body(
            email,
            ACTIVATION_SUBJECT,
            Some(activation_html(&link)),
            Some(activation_text(&link)),
        );
        self.send(body).await
    }

    #[instrument(skip(self), err)]
    async fn send_activation_success_email(&self, email: &str) -> Result<(), MailError> {
        let body = self.body(
            email,
            ACTIVATION_SUCCESS_SUBJECT,
            None,
            Some(activation_success_text()),
        );
        self.send(body).await
    }
}
