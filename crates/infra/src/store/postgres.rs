//! Postgres-backed account and revocation stores.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Duplicate` |
//! | Database (other) | Any other | `Unavailable` |
//! | PoolClosed / Io / Other | N/A | `Unavailable` |
//!
//! ## Concurrency
//!
//! Activation is a single conditional `UPDATE ... WHERE is_active = FALSE AND
//! activation_token = $2`; revocation is `INSERT ... ON CONFLICT DO NOTHING`.
//! Neither needs an explicit transaction or application-side locking.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use backoffice_auth::{
    Account, AccountStore, InsertOutcome, NewAccount, RevocationStore, RevokedToken, StoreError,
};
use backoffice_core::AccountId;

const SCHEMA: &str = include_str!("../../migrations/0001_auth.sql");

/// Create the tables and indexes if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::raw_sql(SCHEMA)
        .execute(pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    Ok(())
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::Duplicate(msg),
                _ => StoreError::Unavailable(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        other => StoreError::Unavailable(format!("{} failed: {}", operation, other)),
    }
}

#[derive(Debug)]
struct AccountRow {
    id: i64,
    email: String,
    password_hash: String,
    is_active: bool,
    activation_token: Option<String>,
    activated_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for AccountRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(AccountRow {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            is_active: row.try_get("is_active")?,
            activation_token: row.try_get("activation_token")?,
            activated_at: row.try_get("activated_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::new(row.id),
            email: row.email,
            password_hash: row.password_hash,
            is_active: row.is_active,
            activation_token: row.activation_token,
            activated_at: row.activated_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, is_active, activation_token, \
     activated_at, created_at, updated_at, deleted_at";

#[derive(Debug, Clone)]
pub struct PostgresAccountStore {
    pool: Arc<PgPool>,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

fn select_live_account(predicate: &str) -> String {
    format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {predicate} AND deleted_at IS NULL")
}

#[async_trait::async_trait]
impl AccountStore for PostgresAccountStore {
    #[instrument(skip(self, email), err)]
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&select_live_account("lower(email) = lower($1)"))
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_email", e))?;
        Ok(row.map(Account::from))
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&select_live_account("id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_id", e))?;
        Ok(row.map(Account::from))
    }

    #[instrument(skip(self, token), err)]
    async fn find_by_activation_token(&self, token: &str) -> Result<Option<Account>, StoreError> {
        let row = sqlx::query_as::<_, AccountRow>(&select_live_account("activation_token = $1"))
            .bind(token)
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("find_by_activation_token", e))?;
        Ok(row.map(Account::from))
    }

    #[instrument(skip(self, account), err)]
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO accounts (email, password_hash, is_active, activation_token, created_at, updated_at)
            VALUES ($1, $2, FALSE, $3, $4, $4)
            RETURNING id
            "#,
        )
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.activation_token)
        .bind(account.created_at)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_account", e))?;

        Ok(account.into_account(AccountId::new(id)))
    }

    #[instrument(skip(self, token), fields(account_id = %id), err)]
    async fn activate_if_pending(
        &self,
        id: AccountId,
        token: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET is_active = TRUE,
                activation_token = NULL,
                activated_at = $3,
                updated_at = $3
            WHERE id = $1
                AND activation_token = $2
                AND is_active = FALSE
                AND deleted_at IS NULL
            "#,
        )
        .bind(id.get())
        .bind(token)
        .bind(at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("activate_if_pending", e))?;

        Ok(result.rows_affected() == 1)
    }

    #[instrument(skip(self), fields(account_id = %id), err)]
    async fn soft_delete(&self, id: AccountId, at: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET deleted_at = $2, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.get())
        .bind(at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("soft_delete", e))?;

        Ok(result.rows_affected() == 1)
    }
}

#[derive(Debug, Clone)]
pub struct PostgresRevocationStore {
    pool: Arc<PgPool>,
}

impl PostgresRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait::async_trait]
impl RevocationStore for PostgresRevocationStore {
    #[instrument(skip(self, record), fields(account_id = %record.account_id), err)]
    async fn insert(&self, record: RevokedToken) -> Result<InsertOutcome, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO revoked_tokens (id, token, account_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (token) DO NOTHING
            "#,
        )
        .bind(*record.id.as_uuid())
        .bind(&record.token)
        .bind(record.account_id.get())
        .bind(record.expires_at)
        .bind(record.created_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_revocation", e))?;

        Ok(if result.rows_affected() == 0 {
            InsertOutcome::AlreadyPresent
        } else {
            InsertOutcome::Inserted
        })
    }

    #[instrument(skip(self, token), err)]
    async fn exists(&self, token: &str) -> Result<bool, StoreError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE token = $1)")
            .bind(token)
            .fetch_one(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("exists_revocation", e))
    }

    #[instrument(skip(self), err)]
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("purge_expired", e))?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decodes_pg_rows<T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow>>() {}

    #[test]
    fn account_row_is_decodable_without_derive_macros() {
        decodes_pg_rows::<AccountRow>();
    }

    #[test]
    fn selected_columns_exist_in_the_schema() {
        for column in ACCOUNT_COLUMNS.split(',').map(str::trim) {
            assert!(SCHEMA.contains(column), "schema lacks column {column}");
        }
    }

    #[test]
    fn live_account_query_hides_deleted_rows() {
        let sql = select_live_account("id = $1");
        assert!(sql.starts_with(&format!("SELECT {ACCOUNT_COLUMNS} FROM accounts")));
        assert!(sql.ends_with("WHERE id = $1 AND deleted_at IS NULL"));
    }

    #[test]
    fn row_converts_into_account() {
        let now = Utc::now();
        let account: Account = AccountRow {
            id: 9,
            email: "a@x.com".into(),
            password_hash: "$2b$04$hash".into(),
            is_active: false,
            activation_token: Some("tok".into()),
            activated_at: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
        .into();

        assert_eq!(account.id, AccountId::new(9));
        assert_eq!(account.activation_token.as_deref(), Some("tok"));
        assert!(!account.is_active);
        assert_eq!(account.created_at, now);
    }

    #[test]
    fn closed_pool_maps_to_unavailable() {
        let err = map_sqlx_error("find_by_email", sqlx::Error::PoolClosed);
        assert!(matches!(err, StoreError::Unavailable(msg) if msg.contains("find_by_email")));
    }
}
