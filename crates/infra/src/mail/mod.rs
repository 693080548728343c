//! Mail adapters for the [`Mailer`](backoffice_auth::Mailer) port.
//!
//! - [`BrevoMailer`]: transactional mail over the Brevo HTTP API.
//! - [`LogMailer`]: writes the activation link to the log (local development).
//! - [`RecordingMailer`]: keeps every message in memory (tests).

mod brevo;
mod log;
mod recording;

pub use brevo::{BrevoMailer, BrevoSettings};
pub use log::LogMailer;
pub use recording::{RecordingMailer, SentMail};

/// Link the recipient follows to confirm their registration.
pub fn activation_link(backend_url: &str, activation_token: &str) -> String {
    format!(
        "{}/auth/confirm/{}",
        backend_url.trim_end_matches('/'),
        activation_token
    )
}

pub(crate) const ACTIVATION_SUBJECT: &str = "Confirm your registration";
pub(crate) const ACTIVATION_SUCCESS_SUBJECT: &str = "Your account is active";

pub(crate) fn activation_text(link: &str) -> String {
    format!("Welcome! Confirm your account by opening the link below.\n\n{link}\n")
}

pub(crate) fn activation_html(link: &str) -> String {
    format!(
        "<p>Welcome! Confirm your account by opening the link below.</p>\
         <p><a href=\"{link}\">Confirm my account</a></p>"
    )
}

pub(crate) fn activation_success_text() -> String {
    "Your account has been activated. You can now sign in.\n".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_joins_base_and_token() {
        assert_eq!(
            activation_link("https://api.example.com", "abc.def.ghi"),
            "https://api.example.com/auth/confirm/abc.def.ghi"
        );
    }

    #[test]
    fn link_tolerates_trailing_slash() {
        assert_eq!(
            activation_link("http://localhost:8080/", "t"),
            "http://localhost:8080/auth/confirm/t"
        );
    }

    #[test]
    fn html_body_contains_link() {
        let body = activation_html("http://x/auth/confirm/t");
        assert!(body.contains("href=\"http://x/auth/confirm/t\""));
    }
}
