use backoffice_auth::{AuthenticatedSubject, CanonicalToken};
use backoffice_core::AccountId;

/// Session context for a request.
///
/// Inserted by the session middleware; present for every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    subject: AuthenticatedSubject,
}

impl SessionContext {
    pub fn new(subject: AuthenticatedSubject) -> Self {
        Self { subject }
    }

    pub fn account_id(&self) -> AccountId {
        self.subject.account_id
    }

    pub fn email(&self) -> &str {
        &self.subject.email
    }

    pub fn is_active(&self) -> bool {
        self.subject.is_active
    }

    /// The canonical session token that authenticated this request.
    pub fn token(&self) -> &CanonicalToken {
        &self.subject.token
    }
}
