//! `backoffice-auth` — authentication and session lifecycle.
//!
//! This crate is intentionally decoupled from HTTP and storage: persistence,
//! mail delivery and bot verification are reached through the ports in
//! [`store`], [`mail`] and [`bot`].

pub mod account;
pub mod bot;
pub mod canonical;
pub mod claims;
pub mod config;
pub mod email;
pub mod error;
pub mod guard;
pub mod ledger;
pub mod lifecycle;
pub mod mail;
pub mod password;
pub mod store;
pub mod token;

pub use account::{Account, AccountState, NewAccount};
pub use bot::{BotCheckError, BotGate, BotVerifier};
pub use canonical::{CanonicalToken, canonicalize};
pub use claims::{ActivationClaims, SessionClaims};
pub use config::{AuthConfig, ConfigError};
pub use error::{AuthError, AuthResult, ErrorKind};
pub use guard::{AuthenticatedSubject, SessionGuard};
pub use ledger::RevocationLedger;
pub use lifecycle::{AccountLifecycle, LoginOutcome};
pub use mail::{MailDispatcher, MailError, Mailer};
pub use password::{PasswordHasher, PasswordPolicy, PasswordPolicyViolation};
pub use store::{AccountStore, InsertOutcome, RevocationStore, RevokedToken, StoreError};
pub use token::{IssuedSession, TokenError, TokenService};
