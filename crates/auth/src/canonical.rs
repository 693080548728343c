//! The single token canonicalization routine.
//!
//! Every path that stores, looks up, or verifies a session token goes through
//! [`canonicalize`]. [`CanonicalToken`] can only be built here, so the
//! revocation ledger and the session guard cannot be handed a raw value.

const SCHEME: &str = "bearer";

/// A session token after scheme and whitespace stripping.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalToken(String);

impl CanonicalToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for CanonicalToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Strip surrounding whitespace and any leading `Bearer` scheme (ASCII
/// case-insensitive, repeated). Idempotent.
pub fn canonicalize(raw: &str) -> CanonicalToken {
    let mut rest = raw.trim();
    while let Some(stripped) = strip_scheme(rest) {
        rest = stripped.trim();
    }
    CanonicalToken(rest.to_string())
}

fn strip_scheme(value: &str) -> Option<&str> {
    let head = value.get(..SCHEME.len())?;
    if !head.eq_ignore_ascii_case(SCHEME) {
        return None;
    }
    let tail = &value[SCHEME.len()..];
    match tail.chars().next() {
        None => Some(tail),
        Some(c) if c.is_whitespace() => Some(tail),
        Some(_) => None,
    }
}
