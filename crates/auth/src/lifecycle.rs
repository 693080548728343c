//! Account lifecycle: registration, activation, login, logout.
//!
//! The only component that mutates an account's activation state.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use backoffice_core::AccountId;

use crate::account::{Account, NewAccount};
use crate::canonical::canonicalize;
use crate::claims::TimeBoxed;
use crate::config::AuthConfig;
use crate::email::normalize_email;
use crate::error::{AuthError, AuthResult};
use crate::guard::SessionGuard;
use crate::ledger::RevocationLedger;
use crate::mail::{MailDispatcher, Mailer};
use crate::password::PasswordHasher;
use crate::store::{AccountStore, RevocationStore, StoreError};
use crate::token::{IssuedSession, TokenService};

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session: IssuedSession,
    pub account: Account,
}

#[derive(Clone)]
pub struct AccountLifecycle {
    config: Arc<AuthConfig>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
    accounts: Arc<dyn AccountStore>,
    ledger: RevocationLedger,
    mail: MailDispatcher,
}

impl AccountLifecycle {
    pub fn new(
        config: Arc<AuthConfig>,
        accounts: Arc<dyn AccountStore>,
        revocations: Arc<dyn RevocationStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            tokens: Arc::new(TokenService::new(&config)),
            hasher: Arc::new(PasswordHasher::new(config.bcrypt_cost())),
            config,
            accounts,
            ledger: RevocationLedger::new(revocations),
            mail: MailDispatcher::new(mailer),
        }
    }

    /// A guard sharing this lifecycle's token service and ledger.
    pub fn session_guard(&self) -> SessionGuard {
        SessionGuard::new(self.tokens.clone(), self.ledger.clone())
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub fn ledger(&self) -> &RevocationLedger {
        &self.ledger
    }

    /// Create a pending account and mail its activation token.
    ///
    /// The mail is dispatched in the background; its outcome never affects
    /// the returned result.
    #[instrument(skip(self, email, password), err)]
    pub async fn register(&self, email: &str, password: &str) -> AuthResult<Account> {
        let email = normalize_email(email)?;
        self.config.password_policy().check(password)?;

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let password_hash = self.hash_password(password).await?;
        let now = Utc::now();
        let activation_token = self.tokens.issue_activation(&email, now)?;

        let account = self
            .accounts
            .create(NewAccount {
                email,
                password_hash,
                activation_token: activation_token.clone(),
                created_at: now,
            })
            .await
            .map_err(|e| match e {
                StoreError::Duplicate(_) => AuthError::EmailTaken,
                other => other.into(),
            })?;

        info!(account_id = %account.id, "account registered (pending activation)");
        self.mail.activation(account.email.clone(), activation_token);

        Ok(account)
    }

    /// Consume an activation token exactly once. Returns the activated email.
    #[instrument(skip(self, activation_token), err)]
    pub async fn activate(&self, activation_token: &str) -> AuthResult<String> {
        let token = activation_token.trim();
        let now = Utc::now();

        let claims = self.tokens.verify_activation(token, now).map_err(|e| {
            warn!(reason = %e, "activation token rejected");
            AuthError::ActivationInvalidOrExpired
        })?;

        let Some(account) = self.accounts.find_by_activation_token(token).await? else {
            return Err(self.resolve_unclaimed(&claims.email).await?);
        };

        if account.email != claims.email {
            warn!(account_id = %account.id, "activation token does not belong to its holder");
            return Err(AuthError::ActivationInvalidOrExpired);
        }
        if account.is_active {
            return Err(AuthError::AlreadyConfirmed);
        }

        if !self.accounts.activate_if_pending(account.id, token, now).await? {
            // Another request consumed the token first.
            return Err(self.resolve_unclaimed(&claims.email).await?);
        }

        info!(account_id = %account.id, "account activated");
        self.mail.activation_success(account.email.clone());

        Ok(account.email)
    }

    /// Verify credentials and issue a session token.
    ///
    /// Unknown email and wrong password are indistinguishable. A pending
    /// account is reported as such only once the password has verified.
    #[instrument(skip(self, email, password), err)]
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<LoginOutcome> {
        let Ok(email) = normalize_email(email) else {
            return Err(AuthError::InvalidCredentials);
        };
        if password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        let Some(account) = self.accounts.find_by_email(&email).await? else {
            self.spend_decoy_verification(password).await?;
            return Err(AuthError::InvalidCredentials);
        };

        if !self.verify_password(password, &account.password_hash).await? {
            warn!(account_id = %account.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        if !account.is_active {
            return Err(AuthError::AccountNotActivated);
        }

        let session = self
            .tokens
            .issue_session(account.id, &account.email, account.is_active, Utc::now())?;
        info!(account_id = %account.id, "session issued");

        Ok(LoginOutcome { session, account })
    }

    /// Revoke a session token until its natural expiry.
    #[instrument(skip(self, raw_token), err)]
    pub async fn logout(&self, raw_token: &str) -> AuthResult<()> {
        let token = canonicalize(raw_token);
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let claims = self
            .tokens
            .decode_session_unverified(token.as_str())
            .ok_or(AuthError::UndecodableToken)?;
        let expires_at = claims.expires_at().ok_or(AuthError::UndecodableToken)?;

        self.ledger.revoke(&token, expires_at, claims.sub).await?;
        info!(account_id = %claims.sub, "session revoked");
        Ok(())
    }

    /// Administrative soft delete; the row is kept for audit.
    #[instrument(skip(self), err)]
    pub async fn delete_account(&self, id: AccountId) -> AuthResult<()> {
        if !self.accounts.soft_delete(id, Utc::now()).await? {
            return Err(AuthError::AccountNotFound);
        }
        info!(account_id = %id, "account soft-deleted");
        Ok(())
    }

    /// Classify a verified activation token that no pending account holds.
    async fn resolve_unclaimed(&self, email: &str) -> AuthResult<AuthError> {
        Ok(match self.accounts.find_by_email(email).await? {
            Some(account) if account.is_active => AuthError::AlreadyConfirmed,
            _ => AuthError::AccountNotFound,
        })
    }

    async fn hash_password(&self, password: &str) -> AuthResult<String> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::internal(format!("hashing task failed: {e}")))?
            .map_err(|e| AuthError::internal(e.to_string()))
    }

    async fn verify_password(&self, password: &str, stored_hash: &str) -> AuthResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
            .await
            .map_err(|e| AuthError::internal(format!("verification task failed: {e}")))
    }

    async fn spend_decoy_verification(&self, password: &str) -> AuthResult<()> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_decoy(&password))
            .await
            .map_err(|e| AuthError::internal(format!("verification task failed: {e}")))
    }
}

impl core::fmt::Debug for AccountLifecycle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccountLifecycle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
