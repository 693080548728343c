use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument};

use backoffice_auth::{BotCheckError, BotVerifier};

const SITEVERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[derive(Debug, Deserialize)]
struct SiteVerifyResponse {
    success: bool,
    #[serde(default, rename = "error-codes")]
    error_codes: Vec<String>,
}

/// Verifies reCAPTCHA challenge responses against Google's siteverify API.
#[derive(Clone)]
pub struct RecaptchaVerifier {
    client: reqwest::Client,
    secret_key: String,
    endpoint: String,
}

impl RecaptchaVerifier {
    pub fn new(secret_key: impl Into<String>) -> Result<Self, BotCheckError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| BotCheckError::Unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            secret_key: secret_key.into(),
            endpoint: SITEVERIFY_URL.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}

#[async_trait::async_trait]
impl BotVerifier for RecaptchaVerifier {
    #[instrument(skip_all, err)]
    async fn verify(&self, challenge_response: &str) -> Result<(), BotCheckError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("secret", self.secret_key.as_str()),
                ("response", challenge_response),
            ])
            .send()
            .await
            .map_err(|e| BotCheckError::Unavailable(format!("siteverify request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(BotCheckError::Unavailable(format!(
                "siteverify returned status {}",
                resp.status().as_u16()
            )));
        }

        let body: SiteVerifyResponse = resp
            .json()
            .await
            .map_err(|e| BotCheckError::Unavailable(format!("siteverify response: {e}")))?;

        if body.success {
            Ok(())
        } else {
            debug!(error_codes = ?body.error_codes, "challenge response rejected");
            Err(BotCheckError::Rejected)
        }
    }
}

impl core::fmt::Debug for RecaptchaVerifier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecaptchaVerifier")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}
