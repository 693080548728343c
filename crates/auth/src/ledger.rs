//! Revocation ledger: durable blacklist of logged-out session tokens.
//!
//! Retention: a record is only meaningful until the token's own expiry, after
//! which signature verification rejects the token anyway. [`RevocationLedger::purge_expired`]
//! drops such records; it is run periodically by the infra sweeper and is not
//! needed for correctness.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use backoffice_core::{AccountId, RevocationId};

use crate::canonical::CanonicalToken;
use crate::store::{InsertOutcome, RevocationStore, RevokedToken, StoreError};

#[derive(Clone)]
pub struct RevocationLedger {
    store: Arc<dyn RevocationStore>,
}

impl RevocationLedger {
    pub fn new(store: Arc<dyn RevocationStore>) -> Self {
        Self { store }
    }

    /// Record `token` as revoked. Revoking twice is a no-op.
    #[instrument(skip(self, token), fields(account_id = %account_id), err)]
    pub async fn revoke(
        &self,
        token: &CanonicalToken,
        expires_at: DateTime<Utc>,
        account_id: AccountId,
    ) -> Result<InsertOutcome, StoreError> {
        let record = RevokedToken {
            id: RevocationId::new(),
            token: token.as_str().to_string(),
            account_id,
            expires_at,
            created_at: Utc::now(),
        };
        let outcome = self.store.insert(record).await?;
        if outcome == InsertOutcome::AlreadyPresent {
            debug!("token was already revoked");
        }
        Ok(outcome)
    }

    pub async fn is_revoked(&self, token: &CanonicalToken) -> Result<bool, StoreError> {
        self.store.exists(token.as_str()).await
    }

    pub async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        self.store.purge_expired(now).await
    }
}

impl core::fmt::Debug for RevocationLedger {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RevocationLedger").finish_non_exhaustive()
    }
}
