//! Outbound mail port and the fire-and-forget dispatcher.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    #[error("mail delivery failed: {0}")]
    Delivery(String),

    #[error("mailer is misconfigured: {0}")]
    Configuration(String),
}

#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_activation_email(&self, email: &str, activation_token: &str) -> Result<(), MailError>;

    async fn send_activation_success_email(&self, email: &str) -> Result<(), MailError>;
}

/// Runs mail deliveries off the caller's critical path.
///
/// Failures are logged and swallowed; they never reach the operation that
/// triggered them.
#[derive(Clone)]
pub struct MailDispatcher {
    mailer: Arc<dyn Mailer>,
}

impl MailDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        Self { mailer }
    }

    pub fn activation(&self, email: String, activation_token: String) {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            match mailer.send_activation_email(&email, &activation_token).await {
                Ok(()) => info!(%email, "activation email sent"),
                Err(e) => warn!(%email, error = %e, "activation email failed"),
            }
        });
    }

    pub fn activation_success(&self, email: String) {
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            match mailer.send_activation_success_email(&email).await {
                Ok(()) => info!(%email, "activation confirmation email sent"),
                Err(e) => warn!(%email, error = %e, "activation confirmation email failed"),
            }
        });
    }
}

impl core::fmt::Debug for MailDispatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MailDispatcher").finish_non_exhaustive()
    }
}
