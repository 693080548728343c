//! In-memory stores for tests/dev.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use backoffice_auth::{
    Account, AccountStore, InsertOutcome, NewAccount, RevocationStore, RevokedToken, StoreError,
};
use backoffice_core::AccountId;

fn poisoned() -> StoreError {
    StoreError::Unavailable("in-memory store lock poisoned".to_string())
}

#[derive(Debug, Default)]
struct Accounts {
    next_id: i64,
    rows: BTreeMap<AccountId, Account>,
}

/// In-memory account table.
///
/// Email uniqueness covers soft-deleted rows, as the Postgres unique index does.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    inner: RwLock<Accounts>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Accounts>, StoreError> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Accounts>, StoreError> {
        self.inner.write().map_err(|_| poisoned())
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.read()?;
        Ok(accounts
            .rows
            .values()
            .find(|a| !a.is_deleted() && a.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let accounts = self.read()?;
        Ok(accounts.rows.get(&id).filter(|a| !a.is_deleted()).cloned())
    }

    async fn find_by_activation_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.read()?;
        Ok(accounts
            .rows
            .values()
            .find(|a| !a.is_deleted() && a.activation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.write()?;
        if accounts
            .rows
            .values()
            .any(|a| a.email.eq_ignore_ascii_case(&account.email))
        {
            return Err(StoreError::Duplicate(format!("email {}", account.email)));
        }

        accounts.next_id += 1;
        let id = AccountId::new(accounts.next_id);
        let stored = account.into_account(id);
        accounts.rows.insert(id, stored.clone());
        Ok(stored)
    }

    async fn activate_if_pending(
        &self,
        id: AccountId,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut accounts = self.write()?;
        let Some(account) = accounts.rows.get_mut(&id) else {
            return Ok(false);
        };
        if account.is_deleted()
            || account.is_active
            || account.activation_token.as_deref() != Some(token)
        {
            return Ok(false);
        }

        account.is_active = true;
        account.activation_token = None;
        account.activated_at = Some(at);
        account.updated_at = at;
        Ok(true)
    }

    async fn soft_delete(&self, id: AccountId, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let mut accounts = self.write()?;
        match accounts.rows.get_mut(&id) {
            Some(account) if !account.is_deleted() => {
                account.deleted_at = Some(at);
                account.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// In-memory revocation ledger keyed by the canonical token.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    inner: RwLock<HashMap<String, RevokedToken>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn insert(&self, record: RevokedToken) -> Result<InsertOutcome, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        if map.contains_key(&record.token) {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        map.insert(record.token.clone(), record);
        Ok(InsertOutcome::Inserted)
    }

    async fn exists(&self, token: &str) -> Result<bool, StoreError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map.contains_key(token))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let before = map.len();
        map.retain(|_token, record| record.expires_at > now);
        Ok((before - map.len()) as u64)
    }
}
