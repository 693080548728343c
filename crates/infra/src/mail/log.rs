use tracing::{debug, info};

use backoffice_auth::{MailError, Mailer};

use super::activation_link;

/// Logs that a message would have been sent (local development without Brevo).
///
/// The activation link goes out at `debug` only, so a local run started with
/// `RUST_LOG=backoffice_infra=debug` can finish registration without a mail
/// provider. Production wiring always uses Brevo when it is configured.
#[derive(Debug, Clone)]
pub struct LogMailer {
    backend_url: String,
}

impl LogMailer {
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: backend_url.into(),
        }
    }

    fn link_for(&self, activation_token: &str) -> String {
        activation_link(&self.backend_url, activation_token)
    }
}

#[async_trait::async_trait]
impl Mailer for LogMailer {
    async fn send_activation_email(&self, email: &str, activation_token: &str) -> Result<(), MailError> {
        let link = self.link_for(activation_token);
        info!(%email, "activation email (not sent, log mailer)");
        debug!(%email, %link, "activation link");
        Ok(())
    }

    async fn send_activation_success_email(&self, email: &str) -> Result<(), MailError> {
        info!(%email, "activation success email (not sent, log mailer)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logged_link_points_at_the_confirm_route() {
        let mailer = LogMailer::new("http://localhost:8080/");
        assert_eq!(mailer.link_for("tok.en"), "http://localhost:8080/auth/confirm/tok.en");
    }

    #[tokio::test]
    async fn sends_never_fail() {
        let mailer = LogMailer::new("http://localhost:8080");
        assert!(mailer.send_activation_email("a@x.com", "tok").await.is_ok());
        assert!(mailer.send_activation_success_email("a@x.com").await.is_ok());
    }
}
