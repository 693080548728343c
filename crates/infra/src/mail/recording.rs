use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use backoffice_auth::{MailError, Mailer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMail {
    Activation { email: String, token: String },
    ActivationSuccess { email: String },
}

/// In-memory mailer that records every message, optionally failing.
#[derive(Debug, Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
    notify: Arc<Notify>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails after being recorded.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Activation token last mailed to `email`.
    pub fn activation_token_for(&self, email: &str) -> Option<String> {
        self.sent().into_iter().rev().find_map(|m| match m {
            SentMail::Activation { email: to, token } if to == email => Some(token),
            _ => None,
        })
    }

    /// Wait until at least `count` messages have been recorded.
    pub async fn wait_for(&self, count: usize) {
        loop {
            let notified = self.notify.notified();
            if self.sent().len() >= count {
                return;
            }
            notified.await;
        }
    }

    fn record(&self, mail: SentMail) -> Result<(), MailError> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(mail);
        }
        self.notify.notify_waiters();
        if self.fail {
            return Err(MailError::Delivery("recording mailer set to fail".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Mailer for RecordingMailer {
    async fn send_activation_email(&self, email: &str, activation_token: &str) -> Result<(), MailError> {
        self.record(SentMail::Activation {
            email: email.to_string(),
            token: activation_token.to_string(),
        })
    }

    async fn send_activation_success_email(&self, email: &str) -> Result<(), MailError> {
        self.record(SentMail::ActivationSuccess {
            email: email.to_string(),
        })
    }
}
