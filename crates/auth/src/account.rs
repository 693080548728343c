//! Account identity record and its lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_core::AccountId;

/// Lifecycle state of an account.
///
/// `Active` is not reversible to `Pending` through normal flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountState {
    Pending,
    Active,
}

/// Stored account.
///
/// # Invariants
/// - Pending: `is_active == false` and `activation_token` is set.
/// - Active: `is_active == true` and `activation_token` is `None`.
/// - `email` is stored normalized (trimmed, lower-case).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    #[serde(skip_serializing)]
    pub activation_token: Option<String>,
    pub activated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Account {
    pub fn state(&self) -> AccountState {
        if self.is_active {
            AccountState::Active
        } else {
            AccountState::Pending
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating a pending account in one atomic write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub email: String,
    pub password_hash: String,
    pub activation_token: String,
    pub created_at: DateTime<Utc>,
}

impl NewAccount {
    /// Materialize the stored record once the store has assigned an id.
    pub fn into_account(self, id: AccountId) -> Account {
        Account {
            id,
            email: self.email,
            password_hash: self.password_hash,
            is_active: false,
            activation_token: Some(self.activation_token),
            activated_at: None,
            created_at: self.created_at,
            updated_at: self.created_at,
            deleted_at: None,
        }
    }
}
