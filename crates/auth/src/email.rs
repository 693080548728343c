//! Email normalization.
//!
//! Addresses are compared case-insensitively; every entry point normalizes
//! through [`normalize_email`] before touching storage.

use backoffice_core::{DomainError, DomainResult};

pub const MAX_EMAIL_LEN: usize = 100;

/// Trim, lower-case and shape-check an email address.
pub fn normalize_email(raw: &str) -> DomainResult<String> {
    let email = raw.trim().to_lowercase();

    if email.is_empty() {
        return Err(DomainError::validation("email is required"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(DomainError::validation(format!(
            "email must be at most {MAX_EMAIL_LEN} characters"
        )));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(DomainError::validation("email must not contain whitespace"));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(DomainError::validation("email must contain '@'"));
    };
    if local.is_empty() || domain.contains('@') {
        return Err(DomainError::validation("email is malformed"));
    }
    let labels_ok = domain.split('.').all(|label| !label.is_empty());
    if !domain.contains('.') || !labels_ok {
        return Err(DomainError::validation("email domain is malformed"));
    }

    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_trims() {
        assert_eq!(normalize_email("  A@X.Com ").unwrap(), "a@x.com");
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "   ", "no-at-sign", "@x.com", "a@", "a@x", "a@@x.com", "a@x..com", "a b@x.com"] {
            assert!(normalize_email(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn rejects_overlong_addresses() {
        let local = "a".repeat(MAX_EMAIL_LEN);
        assert!(normalize_email(&format!("{local}@x.com")).is_err());
    }
}
