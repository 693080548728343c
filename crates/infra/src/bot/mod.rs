//! Bot-verification adapters for the [`BotVerifier`](backoffice_auth::BotVerifier) port.

mod recaptcha;

pub use recaptcha::RecaptchaVerifier;
