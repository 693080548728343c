use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use backoffice_auth::{Account, LoginOutcome};
use backoffice_core::AccountId;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub recaptcha_token: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// `{ "success": true, "data": { "records": [...], "total_count": n } }`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Records<T>,
}

#[derive(Debug, Serialize)]
pub struct Records<T> {
    pub records: Vec<T>,
    pub total_count: usize,
}

impl<T> Envelope<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            success: true,
            data: Records {
                total_count: records.len(),
                records,
            },
        }
    }

    pub fn single(record: T) -> Self {
        Self::new(vec![record])
    }
}

#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub user_id: AccountId,
    pub email: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(a: Account) -> Self {
        Self {
            user_id: a.id,
            email: a.email,
            is_active: a.is_active,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: AccountId,
    pub email: String,
    pub is_active: bool,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(o: LoginOutcome) -> Self {
        Self {
            user_id: o.account.id,
            email: o.account.email,
            is_active: o.account.is_active,
            access_token: o.session.token,
            token_type: "Bearer",
            expires_in: o.session.expires_in_seconds,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ConfirmationResponse {
    pub email: String,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WhoAmIResponse {
    pub user_id: AccountId,
    pub email: String,
    pub is_active: bool,
}
