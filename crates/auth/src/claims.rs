use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use backoffice_core::AccountId;

use crate::token::TokenError;

pub const SESSION_AUDIENCE: &str = "session";
pub const ACTIVATION_AUDIENCE: &str = "activation";

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the account the session belongs to.
    pub sub: AccountId,
    pub email: String,
    pub is_active: bool,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Unique per issuance.
    pub jti: Uuid,
    pub aud: String,
}

/// Claims carried by an activation token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivationClaims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
}

/// Time-boxed claims share one validation rule.
pub trait TimeBoxed {
    fn issued_at_secs(&self) -> i64;
    fn expires_at_secs(&self) -> i64;

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expires_at_secs(), 0).single()
    }
}

impl TimeBoxed for SessionClaims {
    fn issued_at_secs(&self) -> i64 {
        self.iat
    }

    fn expires_at_secs(&self) -> i64 {
        self.exp
    }
}

impl TimeBoxed for ActivationClaims {
    fn issued_at_secs(&self) -> i64 {
        self.iat
    }

    fn expires_at_secs(&self) -> i64 {
        self.exp
    }
}

/// Deterministically validate the time window of verified claims.
pub fn validate_window<C: TimeBoxed>(claims: &C, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.expires_at_secs() <= claims.issued_at_secs() {
        return Err(TokenError::Malformed);
    }
    if now.timestamp() >= claims.expires_at_secs() {
        return Err(TokenError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(iat: i64, exp: i64) -> ActivationClaims {
        ActivationClaims {
            email: "a@x.com".into(),
            iat,
            exp,
            aud: ACTIVATION_AUDIENCE.into(),
        }
    }

    #[test]
    fn window_accepts_until_expiry() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        assert_eq!(validate_window(&claims(900, 1_001), now), Ok(()));
        assert_eq!(validate_window(&claims(900, 1_000), now), Err(TokenError::Expired));
    }

    #[test]
    fn inverted_window_is_malformed() {
        let now = Utc.timestamp_opt(1_000, 0).unwrap();
        assert_eq!(validate_window(&claims(2_000, 2_000), now), Err(TokenError::Malformed));
    }

    #[test]
    fn expires_at_converts_seconds() {
        let c = claims(0, 86_400);
        assert_eq!(c.expires_at().unwrap().timestamp(), 86_400);
    }
}
