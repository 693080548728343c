//! Immutable configuration for the authentication subsystem.
//!
//! Built once at process start and shared by reference; every field is
//! validated up front so a missing secret is a startup failure, never a
//! per-request one.

use std::time::Duration;

use thiserror::Error;

use crate::password::{MAX_COST, MIN_COST, PasswordPolicy};

pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_ACTIVATION_TTL: Duration = Duration::from_secs(24 * 60 * 60);
pub const DEFAULT_BCRYPT_COST: u32 = 12;
/// Upper bound for either token lifetime (ten years).
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    session_secret: Vec<u8>,
    activation_secret: Vec<u8>,
    session_ttl: Duration,
    activation_ttl: Duration,
    bcrypt_cost: u32,
    password_policy: PasswordPolicy,
}

impl AuthConfig {
    /// Build a configuration with default lifetimes, cost and policy.
    pub fn new(
        session_secret: impl Into<Vec<u8>>,
        activation_secret: impl Into<Vec<u8>>,
    ) -> Result<Self, ConfigError> {
        let session_secret = session_secret.into();
        let activation_secret = activation_secret.into();

        if session_secret.is_empty() {
            return Err(ConfigError::Missing("session secret"));
        }
        if activation_secret.is_empty() {
            return Err(ConfigError::Missing("activation secret"));
        }
        if session_secret == activation_secret {
            return Err(ConfigError::invalid(
                "activation secret",
                "must differ from the session secret",
            ));
        }

        Ok(Self {
            session_secret,
            activation_secret,
            session_ttl: DEFAULT_SESSION_TTL,
            activation_ttl: DEFAULT_ACTIVATION_TTL,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            password_policy: PasswordPolicy::strict(),
        })
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Result<Self, ConfigError> {
        check_ttl("session ttl", ttl)?;
        self.session_ttl = ttl;
        Ok(self)
    }

    pub fn with_activation_ttl(mut self, ttl: Duration) -> Result<Self, ConfigError> {
        check_ttl("activation ttl", ttl)?;
        self.activation_ttl = ttl;
        Ok(self)
    }

    pub fn with_bcrypt_cost(mut self, cost: u32) -> Result<Self, ConfigError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(ConfigError::invalid(
                "bcrypt cost",
                format!("must be within {}..={}", MIN_COST, MAX_COST),
            ));
        }
        self.bcrypt_cost = cost;
        Ok(self)
    }

    pub fn with_password_policy(mut self, policy: PasswordPolicy) -> Self {
        self.password_policy = policy;
        self
    }

    pub fn session_secret(&self) -> &[u8] {
        &self.session_secret
    }

    pub fn activation_secret(&self) -> &[u8] {
        &self.activation_secret
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub fn activation_ttl(&self) -> Duration {
        self.activation_ttl
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }

    pub fn password_policy(&self) -> &PasswordPolicy {
        &self.password_policy
    }
}

// Secrets stay out of logs.
impl core::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("session_secret", &"<redacted>")
            .field("activation_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("activation_ttl", &self.activation_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("password_policy", &self.password_policy)
            .finish()
    }
}

fn check_ttl(key: &'static str, ttl: Duration) -> Result<(), ConfigError> {
    if ttl.as_secs() == 0 {
        return Err(ConfigError::invalid(key, "must be at least one second"));
    }
    if ttl > MAX_TOKEN_TTL {
        return Err(ConfigError::invalid(
            key,
            format!("must be at most {} seconds", MAX_TOKEN_TTL.as_secs()),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_lifetimes() {
        let cfg = AuthConfig::new("session", "activation").unwrap();
        assert_eq!(cfg.session_ttl().as_secs(), 3600);
        assert_eq!(cfg.activation_ttl().as_secs(), 86_400);
        assert_eq!(cfg.bcrypt_cost(), 12);
    }

    #[test]
    fn empty_secrets_are_rejected() {
        assert_eq!(
            AuthConfig::new("", "activation").unwrap_err(),
            ConfigError::Missing("session secret")
        );
        assert_eq!(
            AuthConfig::new("session", "").unwrap_err(),
            ConfigError::Missing("activation secret")
        );
    }

    #[test]
    fn shared_secret_is_rejected() {
        let err = AuthConfig::new("same", "same").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "activation secret", .. }));
    }

    #[test]
    fn zero_ttl_and_out_of_range_cost_are_rejected() {
        let cfg = AuthConfig::new("session", "activation").unwrap();
        assert!(cfg.clone().with_session_ttl(Duration::ZERO).is_err());
        assert!(cfg.clone().with_activation_ttl(Duration::from_millis(10)).is_err());
        assert!(cfg.clone().with_bcrypt_cost(3).is_err());
        assert!(cfg.with_bcrypt_cost(32).is_err());
    }

    #[test]
    fn oversized_ttl_is_rejected() {
        let cfg = AuthConfig::new("session", "activation").unwrap();
        assert!(cfg.clone().with_session_ttl(Duration::from_secs(u64::MAX)).is_err());
        assert!(cfg.clone().with_session_ttl(Duration::from_secs(10_000_000_000_000)).is_err());
        assert!(cfg.clone().with_activation_ttl(MAX_TOKEN_TTL + Duration::from_secs(1)).is_err());
        assert!(cfg.with_session_ttl(MAX_TOKEN_TTL).is_ok());
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = AuthConfig::new("top-secret-session", "top-secret-activation").unwrap();
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
