//! Credential hashing and the password-strength policy.

use std::sync::OnceLock;

use thiserror::Error;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;

/// Characters accepted as "special" by [`PasswordPolicy::strict`].
pub const SPECIAL_CHARACTERS: &str = "@$!%*?&";

/// bcrypt ignores everything past this many bytes of input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// One-way bcrypt hashing with a fixed work factor.
///
/// bcrypt digests are self-describing (`$2b$<cost>$<salt><hash>`) and salted
/// per call, so equal passwords never produce equal hashes.
#[derive(Debug)]
pub struct PasswordHasher {
    cost: u32,
    decoy: OnceLock<Option<String>>,
}

#[derive(Debug, Error)]
#[error("password hashing failed: {0}")]
pub struct HashError(String);

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self {
            cost,
            decoy: OnceLock::new(),
        }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Inputs longer than [`MAX_PASSWORD_BYTES`] are refused rather than truncated.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(HashError(format!(
                "password exceeds {MAX_PASSWORD_BYTES} bytes"
            )));
        }
        bcrypt::hash(plaintext, self.cost).map_err(|e| HashError(e.to_string()))
    }

    /// Compare `plaintext` against a stored digest.
    ///
    /// The digest comparison itself is constant-time. A stored value that is
    /// not a parseable bcrypt digest verifies as `false`, as does a plaintext
    /// longer than [`MAX_PASSWORD_BYTES`].
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> bool {
        if plaintext.is_empty() || stored_hash.is_empty() || plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::verify(plaintext, stored_hash).unwrap_or(false)
    }

    /// Spend the same work as a real verification against a throwaway digest.
    ///
    /// Used when no account matches, so response timing does not reveal
    /// whether an email is registered.
    pub fn verify_decoy(&self, plaintext: &str) {
        let decoy = self
            .decoy
            .get_or_init(|| bcrypt::hash("decoy-password-never-matches", self.cost).ok());
        if let Some(decoy) = decoy {
            let _ = self.verify(plaintext, decoy);
        }
    }
}

/// Explicit, testable password-strength rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    /// Minimum length in characters.
    pub min_length: usize,
    /// Maximum length in bytes; never above [`MAX_PASSWORD_BYTES`].
    pub max_bytes: usize,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl PasswordPolicy {
    /// At least 8 characters, at most 72 bytes, with lower, upper, digit and
    /// one of `@$!%*?&`.
    pub fn strict() -> Self {
        Self {
            min_length: 8,
            max_bytes: MAX_PASSWORD_BYTES,
            require_lowercase: true,
            require_uppercase: true,
            require_digit: true,
            require_special: true,
        }
    }

    /// Length bound only.
    pub fn length_only(min_length: usize) -> Self {
        Self {
            min_length,
            max_bytes: MAX_PASSWORD_BYTES,
            require_lowercase: false,
            require_uppercase: false,
            require_digit: false,
            require_special: false,
        }
    }

    pub fn check(&self, password: &str) -> Result<(), PasswordPolicyViolation> {
        let mut failures = Vec::new();
        let length = password.chars().count();

        if length < self.min_length {
            failures.push(format!("at least {} characters", self.min_length));
        }
        let max_bytes = self.max_bytes.min(MAX_PASSWORD_BYTES);
        if password.len() > max_bytes {
            failures.push(format!("at most {max_bytes} bytes"));
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            failures.push("a lowercase letter".to_string());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            failures.push("an uppercase letter".to_string());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            failures.push("a digit".to_string());
        }
        if self.require_special && !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
            failures.push(format!("one of {SPECIAL_CHARACTERS}"));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PasswordPolicyViolation { failures })
        }
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::strict()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("password must contain {}", failures.join(", "))]
pub struct PasswordPolicyViolation {
    pub failures: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> PasswordHasher {
        PasswordHasher::new(MIN_COST)
    }

    #[test]
    fn hash_then_verify() {
        let h = hasher();
        let digest = h.hash("Secret123!").unwrap();
        assert!(digest.starts_with("$2"));
        assert!(h.verify("Secret123!", &digest));
        assert!(!h.verify("Secret123?", &digest));
    }

    #[test]
    fn hashes_are_salted() {
        let h = hasher();
        assert_ne!(h.hash("Secret123!").unwrap(), h.hash("Secret123!").unwrap());
    }

    #[test]
    fn malformed_stored_hash_verifies_false() {
        let h = hasher();
        assert!(!h.verify("Secret123!", "Secret123!"));
        assert!(!h.verify("Secret123!", "$2b$04$tooshort"));
        assert!(!h.verify("Secret123!", ""));
        assert!(!h.verify("", "$2b$04$abcdefghijklmnopqrstuuABCDEFGHIJKLMNOPQRSTUVWXYZ01234"));
    }

    #[test]
    fn decoy_verification_does_not_panic() {
        hasher().verify_decoy("whatever");
    }

    #[test]
    fn strict_policy_accepts_example_password() {
        assert!(PasswordPolicy::strict().check("Secret123!").is_ok());
    }

    #[test]
    fn strict_policy_reports_every_missing_class() {
        let err = PasswordPolicy::strict().check("short").unwrap_err();
        assert!(err.failures.iter().any(|f| f.contains("at least 8")));
        assert!(err.failures.iter().any(|f| f.contains("uppercase")));
        assert!(err.failures.iter().any(|f| f.contains("digit")));
        assert!(err.failures.iter().any(|f| f.contains("@$!%*?&")));
        assert!(!err.failures.iter().any(|f| f.contains("lowercase")));
    }

    #[test]
    fn length_only_policy_ignores_character_classes() {
        let policy = PasswordPolicy::length_only(8);
        assert!(policy.check("aaaaaaaa").is_ok());
        assert!(policy.check("aaaaaaa").is_err());
        assert!(policy.check(&"a".repeat(73)).is_err());
    }

    #[test]
    fn policy_limit_is_counted_in_bytes() {
        let policy = PasswordPolicy::strict();
        let at_limit = format!("Aa1!{}", "x".repeat(MAX_PASSWORD_BYTES - 4));
        assert!(policy.check(&at_limit).is_ok());

        // 24 three-byte characters: few characters, too many bytes.
        let wide = format!("Aa1!{}", "€".repeat(24));
        assert!(wide.chars().count() < MAX_PASSWORD_BYTES);
        let err = policy.check(&wide).unwrap_err();
        assert!(err.failures.iter().any(|f| f.contains("72 bytes")));
    }

    #[test]
    fn raised_max_bytes_is_still_capped() {
        let policy = PasswordPolicy {
            max_bytes: 255,
            ..PasswordPolicy::length_only(8)
        };
        assert!(policy.check(&"a".repeat(100)).is_err());
    }

    #[test]
    fn long_passwords_sharing_a_prefix_do_not_collide() {
        let h = hasher();
        let base = format!("Aa1!{}", "x".repeat(80));
        assert!(h.hash(&base).is_err());

        let at_limit = format!("Aa1!{}", "x".repeat(MAX_PASSWORD_BYTES - 4));
        let digest = h.hash(&at_limit).unwrap();
        assert!(h.verify(&at_limit, &digest));
        assert!(!h.verify(&format!("{at_limit}DIFFERENT"), &digest));
    }
}
