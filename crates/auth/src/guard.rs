//! Per-request session gate.
//!
//! Steps run in a fixed order:
//! 1. canonicalize the raw `Authorization` value
//! 2. require a non-empty token
//! 3. verify signature and expiry
//! 4. consult the revocation ledger
//!
//! The ledger is only queried for tokens that passed step 3.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use backoffice_core::AccountId;

use crate::canonical::{CanonicalToken, canonicalize};
use crate::claims::SessionClaims;
use crate::error::{AuthError, AuthResult};
use crate::ledger::RevocationLedger;
use crate::token::TokenService;

/// Identity exposed to protected operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSubject {
    pub account_id: AccountId,
    pub email: String,
    pub is_active: bool,
    pub token: CanonicalToken,
}

#[derive(Clone)]
pub struct SessionGuard {
    tokens: Arc<TokenService>,
    ledger: RevocationLedger,
}

impl SessionGuard {
    pub fn new(tokens: Arc<TokenService>, ledger: RevocationLedger) -> Self {
        Self { tokens, ledger }
    }

    pub async fn check(&self, authorization: Option<&str>) -> AuthResult<AuthenticatedSubject> {
        self.check_at(authorization, Utc::now()).await
    }

    pub async fn check_at(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthResult<AuthenticatedSubject> {
        let token = canonicalize(authorization.unwrap_or_default());

        let outcome = self.run(token, now).await;
        if let Err(e) = &outcome {
            warn!(reason = e.code(), "session rejected");
        }
        outcome
    }

    async fn run(&self, token: CanonicalToken, now: DateTime<Utc>) -> AuthResult<AuthenticatedSubject> {
        require_present(&token)?;
        let claims = verify_signature(&self.tokens, &token, now)?;
        self.require_not_revoked(&token).await?;

        Ok(AuthenticatedSubject {
            account_id: claims.sub,
            email: claims.email,
            is_active: claims.is_active,
            token,
        })
    }

    async fn require_not_revoked(&self, token: &CanonicalToken) -> AuthResult<()> {
        if self.ledger.is_revoked(token).await? {
            return Err(AuthError::RevokedToken);
        }
        Ok(())
    }
}

fn require_present(token: &CanonicalToken) -> AuthResult<()> {
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(())
}

fn verify_signature(
    tokens: &TokenService,
    token: &CanonicalToken,
    now: DateTime<Utc>,
) -> AuthResult<SessionClaims> {
    tokens
        .verify_session(token.as_str(), now)
        .map_err(AuthError::InvalidToken)
}

impl core::fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionGuard").finish_non_exhaustive()
    }
}
