//! Signing and verification of session and activation tokens.
//!
//! The two token kinds use independent HS256 secrets and distinct audiences,
//! so a token minted for one context never verifies in the other.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use backoffice_core::AccountId;

use crate::claims::{
    ACTIVATION_AUDIENCE, ActivationClaims, SESSION_AUDIENCE, SessionClaims, TimeBoxed,
    validate_window,
};
use crate::config::{AuthConfig, MAX_TOKEN_TTL};
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("token signature is invalid")]
    SignatureInvalid,
}

/// A freshly issued session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_in_seconds: u64,
    pub claims: SessionClaims,
}

struct SigningContext {
    encoding: EncodingKey,
    decoding: DecodingKey,
    audience: &'static str,
    ttl: ChronoDuration,
}

impl SigningContext {
    fn new(secret: &[u8], audience: &'static str, ttl: std::time::Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            audience,
            ttl: bounded_ttl(ttl),
        }
    }

    /// `now + ttl`, or an internal error when the result leaves chrono's range.
    fn expiry_from(&self, now: DateTime<Utc>) -> AuthResult<DateTime<Utc>> {
        now.checked_add_signed(self.ttl).ok_or_else(|| {
            AuthError::internal(format!("{} token expiry is out of range", self.audience))
        })
    }

    fn sign<C: Serialize>(&self, claims: &C) -> AuthResult<String> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AuthError::internal(format!("failed to sign {} token: {e}", self.audience)))
    }

    fn verify<C: DeserializeOwned + TimeBoxed>(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<C, TokenError> {
        // Expiry is checked against the caller's clock below, not the system one.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_audience(&[self.audience]);
        validation.set_required_spec_claims(&["exp", "aud"]);

        let data = jsonwebtoken::decode::<C>(token, &self.decoding, &validation)
            .map_err(|e| map_jwt_error(e.kind()))?;
        validate_window(&data.claims, now)?;
        Ok(data.claims)
    }
}

/// `AuthConfig` bounds lifetimes; clamp again so the conversion can never wrap.
fn bounded_ttl(ttl: std::time::Duration) -> ChronoDuration {
    let secs = ttl.min(MAX_TOKEN_TTL).as_secs();
    ChronoDuration::seconds(i64::try_from(secs).unwrap_or(i64::MAX).max(1))
}

fn map_jwt_error(kind: &JwtErrorKind) -> TokenError {
    match kind {
        JwtErrorKind::InvalidSignature
        | JwtErrorKind::InvalidAudience
        | JwtErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
        JwtErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

/// Issues and verifies both token kinds. Pure: no I/O.
pub struct TokenService {
    session: SigningContext,
    activation: SigningContext,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            session: SigningContext::new(
                config.session_secret(),
                SESSION_AUDIENCE,
                config.session_ttl(),
            ),
            activation: SigningContext::new(
                config.activation_secret(),
                ACTIVATION_AUDIENCE,
                config.activation_ttl(),
            ),
        }
    }

    pub fn issue_session(
        &self,
        account_id: AccountId,
        email: &str,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedSession> {
        let expires_at = self.session.expiry_from(now)?;
        let claims = SessionClaims {
            sub: account_id,
            email: email.to_string(),
            is_active,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::now_v7(),
            aud: SESSION_AUDIENCE.to_string(),
        };
        let token = self.session.sign(&claims)?;

        Ok(IssuedSession {
            token,
            issued_at: now,
            expires_in_seconds: self.session.ttl.num_seconds().unsigned_abs(),
            claims,
        })
    }

    pub fn issue_activation(&self, email: &str, now: DateTime<Utc>) -> AuthResult<String> {
        let claims = ActivationClaims {
            email: email.to_string(),
            iat: now.timestamp(),
            exp: self.activation.expiry_from(now)?.timestamp(),
            aud: ACTIVATION_AUDIENCE.to_string(),
        };
        self.activation.sign(&claims)
    }

    pub fn verify_session(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        self.session.verify(token, now)
    }

    pub fn verify_activation(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<ActivationClaims, TokenError> {
        self.activation.verify(token, now)
    }

    /// Parse session claims **without** checking the signature or expiry.
    ///
    /// Only for bookkeeping on a token that already passed
    /// [`TokenService::verify_session`]; never an authentication decision.
    pub fn decode_session_unverified(&self, token: &str) -> Option<SessionClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data =
            jsonwebtoken::decode::<SessionClaims>(token, &DecodingKey::from_secret(&[]), &validation)
                .ok()?;
        (data.claims.aud == SESSION_AUDIENCE).then_some(data.claims)
    }
}

impl core::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenService")
            .field("session_ttl", &self.session.ttl)
            .field("activation_ttl", &self.activation.ttl)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use proptest::prelude::*;

    use super::*;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig::new("session-secret", "activation-secret").unwrap())
    }

    #[test]
    fn session_round_trips_before_expiry() {
        let svc = service();
        let now = Utc::now();
        let issued = svc.issue_session(AccountId::new(7), "a@x.com", true, now).unwrap();
        assert_eq!(issued.expires_in_seconds, 3600);

        let claims = svc.verify_session(&issued.token, now + ChronoDuration::minutes(59)).unwrap();
        assert_eq!(claims.sub, AccountId::new(7));
        assert_eq!(claims.email, "a@x.com");
        assert!(claims.is_active);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn session_expires_after_configured_lifetime() {
        let cfg = AuthConfig::new("s", "a")
            .unwrap()
            .with_session_ttl(Duration::from_secs(120))
            .unwrap();
        let svc = TokenService::new(&cfg);
        let now = Utc::now();
        let issued = svc.issue_session(AccountId::new(1), "a@x.com", true, now).unwrap();

        assert!(svc.verify_session(&issued.token, now + ChronoDuration::seconds(119)).is_ok());
        assert_eq!(
            svc.verify_session(&issued.token, now + ChronoDuration::seconds(120)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn expiry_past_the_calendar_is_an_error_not_a_panic() {
        let cfg = AuthConfig::new("s", "a")
            .unwrap()
            .with_session_ttl(MAX_TOKEN_TTL)
            .unwrap()
            .with_activation_ttl(MAX_TOKEN_TTL)
            .unwrap();
        let svc = TokenService::new(&cfg);
        let near_end = DateTime::<Utc>::MAX_UTC - ChronoDuration::days(1);

        let err = svc.issue_session(AccountId::new(1), "a@x.com", true, near_end).unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
        assert!(matches!(svc.issue_activation("a@x.com", near_end), Err(AuthError::Internal(_))));
    }

    #[test]
    fn longest_allowed_lifetime_issues_valid_tokens() {
        let cfg = AuthConfig::new("s", "a")
            .unwrap()
            .with_session_ttl(MAX_TOKEN_TTL)
            .unwrap();
        let svc = TokenService::new(&cfg);
        let now = Utc::now();
        let issued = svc.issue_session(AccountId::new(1), "a@x.com", true, now).unwrap();

        assert_eq!(issued.expires_in_seconds, MAX_TOKEN_TTL.as_secs());
        assert!(issued.claims.exp > issued.claims.iat);
        assert!(svc.verify_session(&issued.token, now).is_ok());
    }

    #[test]
    fn activation_lives_longer_than_session() {
        let svc = service();
        let now = Utc::now();
        let token = svc.issue_activation("a@x.com", now).unwrap();

        let later = now + ChronoDuration::hours(23);
        assert_eq!(svc.verify_activation(&token, later).unwrap().email, "a@x.com");
        assert_eq!(
            svc.verify_activation(&token, now + ChronoDuration::hours(24)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn tokens_cannot_cross_contexts() {
        let svc = service();
        let now = Utc::now();
        let session = svc.issue_session(AccountId::new(1), "a@x.com", true, now).unwrap();
        let activation = svc.issue_activation("a@x.com", now).unwrap();

        assert_eq!(svc.verify_activation(&session.token, now), Err(TokenError::SignatureInvalid));
        assert_eq!(svc.verify_session(&activation, now), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn tokens_signed_with_another_secret_are_rejected() {
        let now = Utc::now();
        let other = TokenService::new(&AuthConfig::new("other-session", "other-activation").unwrap());
        let forged = other.issue_session(AccountId::new(1), "a@x.com", true, now).unwrap();
        assert_eq!(service().verify_session(&forged.token, now), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let svc = service();
        let now = Utc::now();
        let issued = svc.issue_session(AccountId::new(1), "a@x.com", true, now).unwrap();
        let mut parts: Vec<&str> = issued.token.split('.').collect();
        let other = svc.issue_session(AccountId::new(2), "b@x.com", true, now).unwrap();
        let other_payload = other.token.split('.').nth(1).unwrap().to_string();
        parts[1] = &other_payload;
        let spliced = parts.join(".");
        assert_eq!(svc.verify_session(&spliced, now), Err(TokenError::SignatureInvalid));
    }

    #[test]
    fn garbage_is_malformed() {
        let svc = service();
        for junk in ["", "abc", "a.b.c", "Bearer x"] {
            assert_eq!(svc.verify_session(junk, Utc::now()), Err(TokenError::Malformed), "{junk:?}");
        }
    }

    #[test]
    fn consecutive_sessions_are_distinct() {
        let svc = service();
        let now = Utc::now();
        let a = svc.issue_session(AccountId::new(1), "a@x.com", true, now).unwrap();
        let b = svc.issue_session(AccountId::new(1), "a@x.com", true, now).unwrap();
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn unverified_decode_recovers_claims_of_expired_token() {
        let svc = service();
        let long_ago = Utc::now() - ChronoDuration::days(3);
        let issued = svc.issue_session(AccountId::new(9), "a@x.com", true, long_ago).unwrap();

        let claims = svc.decode_session_unverified(&issued.token).unwrap();
        assert_eq!(claims.sub, AccountId::new(9));
        assert_eq!(claims.exp, issued.claims.exp);
        assert!(svc.decode_session_unverified("not-a-token").is_none());
    }

    #[test]
    fn unverified_decode_ignores_activation_tokens() {
        let svc = service();
        let token = svc.issue_activation("a@x.com", Utc::now()).unwrap();
        assert!(svc.decode_session_unverified(&token).is_none());
    }

    proptest! {
        #[test]
        fn session_claims_round_trip(id in 1i64..i64::MAX, local in "[a-z0-9]{1,20}", active: bool) {
            let svc = service();
            let now = Utc::now();
            let email = format!("{local}@example.com");
            let issued = svc.issue_session(AccountId::new(id), &email, active, now).unwrap();
            let claims = svc.verify_session(&issued.token, now).unwrap();
            prop_assert_eq!(claims.sub, AccountId::new(id));
            prop_assert_eq!(claims.email, email);
            prop_assert_eq!(claims.is_active, active);
        }
    }
}
