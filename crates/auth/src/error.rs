//! Error taxonomy of the authentication subsystem.
//!
//! Every failure carries a precise variant for logging, and maps onto a
//! coarse [`ErrorKind`] that the transport layer renders to callers.

use thiserror::Error;

use backoffice_core::DomainError;

use crate::bot::BotCheckError;
use crate::password::PasswordPolicyViolation;
use crate::store::StoreError;
use crate::token::TokenError;

pub type AuthResult<T> = Result<T, AuthError>;

/// Caller-facing classification of an [`AuthError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Authentication,
    Authorization,
    NotFound,
    Internal,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("email is already registered")]
    EmailTaken,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("bot verification failed")]
    BotCheckFailed,

    #[error("account has not been activated")]
    AccountNotActivated,

    #[error("no token provided")]
    MissingToken,

    #[error("invalid token: {0}")]
    InvalidToken(TokenError),

    #[error("token could not be decoded")]
    UndecodableToken,

    #[error("token has been revoked")]
    RevokedToken,

    #[error("activation token is invalid or expired")]
    ActivationInvalidOrExpired,

    #[error("account is already confirmed")]
    AlreadyConfirmed,

    #[error("account not found")]
    AccountNotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Validation(_) => ErrorKind::Validation,
            AuthError::EmailTaken | AuthError::AlreadyConfirmed => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::BotCheckFailed
            | AuthError::MissingToken
            | AuthError::InvalidToken(_)
            | AuthError::UndecodableToken
            | AuthError::ActivationInvalidOrExpired => ErrorKind::Authentication,
            AuthError::AccountNotActivated | AuthError::RevokedToken => ErrorKind::Authorization,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Stable snake_case label, used in log fields and response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::Validation(_) => "validation_error",
            AuthError::EmailTaken => "email_taken",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::BotCheckFailed => "bot_check_failed",
            AuthError::AccountNotActivated => "account_not_activated",
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidToken(TokenError::Malformed) => "malformed_token",
            AuthError::InvalidToken(TokenError::Expired) => "expired_token",
            AuthError::InvalidToken(TokenError::SignatureInvalid) => "signature_invalid",
            AuthError::UndecodableToken => "undecodable_token",
            AuthError::RevokedToken => "revoked_token",
            AuthError::ActivationInvalidOrExpired => "activation_invalid_or_expired",
            AuthError::AlreadyConfirmed => "already_confirmed",
            AuthError::AccountNotFound => "account_not_found",
            AuthError::Internal(_) => "internal_error",
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(value: StoreError) -> Self {
        AuthError::Internal(value.to_string())
    }
}

impl From<PasswordPolicyViolation> for AuthError {
    fn from(value: PasswordPolicyViolation) -> Self {
        AuthError::Validation(value.to_string())
    }
}

impl From<DomainError> for AuthError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => AuthError::Validation(msg),
        }
    }
}

impl From<BotCheckError> for AuthError {
    fn from(value: BotCheckError) -> Self {
        match value {
            BotCheckError::Missing | BotCheckError::Rejected => AuthError::BotCheckFailed,
            BotCheckError::Unavailable(msg) => AuthError::Internal(msg),
        }
    }
}
