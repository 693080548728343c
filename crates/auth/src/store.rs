//! Storage ports consumed by the authentication subsystem.
//!
//! Adapters live in `backoffice-infra`. Every lookup ignores soft-deleted
//! accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use backoffice_core::{AccountId, RevocationId};

use crate::account::{Account, NewAccount};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A unique constraint rejected the write.
    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Case-insensitive lookup; callers pass a normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError>;

    async fn find_by_activation_token(&self, token: &str) -> Result<Option<Account>, StoreError>;

    /// Insert a pending account. A taken email yields [`StoreError::Duplicate`].
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Compare-and-set: activate `id` only if it is still pending and still
    /// holds `token`. Returns whether this call performed the transition.
    async fn activate_if_pending(
        &self,
        id: AccountId,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Mark the account deleted. Returns `false` if it was absent or already deleted.
    async fn soft_delete(&self, id: AccountId, at: DateTime<Utc>) -> Result<bool, StoreError>;
}

/// A session token that must no longer be honored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokedToken {
    pub id: RevocationId,
    /// Canonicalized token value; unique.
    pub token: String,
    pub account_id: AccountId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyPresent,
}

#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    /// Insert unless the token is already present (no error, no duplicate).
    async fn insert(&self, record: RevokedToken) -> Result<InsertOutcome, StoreError>;

    /// Exact, byte-for-byte match on the stored token.
    async fn exists(&self, token: &str) -> Result<bool, StoreError>;

    /// Delete records whose original expiry is at or before `now`.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
