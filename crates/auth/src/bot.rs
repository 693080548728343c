//! Bot-verification precondition gate.

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BotCheckError {
    #[error("no challenge response provided")]
    Missing,

    #[error("challenge response rejected")]
    Rejected,

    #[error("bot verification unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait BotVerifier: Send + Sync {
    async fn verify(&self, challenge_response: &str) -> Result<(), BotCheckError>;
}

/// Consulted before login and registration, ahead of any credential logic.
#[derive(Clone)]
pub struct BotGate {
    verifier: Option<Arc<dyn BotVerifier>>,
}

impl BotGate {
    pub fn new(verifier: Arc<dyn BotVerifier>) -> Self {
        Self {
            verifier: Some(verifier),
        }
    }

    /// A gate that lets every request through (local development).
    pub fn disabled() -> Self {
        Self { verifier: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.verifier.is_some()
    }

    pub async fn check(&self, challenge_response: Option<&str>) -> Result<(), BotCheckError> {
        let Some(verifier) = &self.verifier else {
            return Ok(());
        };
        let response = challenge_response
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or(BotCheckError::Missing)?;

        verifier.verify(response).await.inspect_err(|e| {
            warn!(error = %e, "bot verification failed");
        })
    }
}

impl core::fmt::Debug for BotGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BotGate")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(bool);

    #[async_trait::async_trait]
    impl BotVerifier for Fixed {
        async fn verify(&self, _challenge_response: &str) -> Result<(), BotCheckError> {
            if self.0 { Ok(()) } else { Err(BotCheckError::Rejected) }
        }
    }

    #[tokio::test]
    async fn disabled_gate_passes_without_response() {
        assert_eq!(BotGate::disabled().check(None).await, Ok(()));
    }

    #[tokio::test]
    async fn enabled_gate_requires_a_response() {
        let gate = BotGate::new(Arc::new(Fixed(true)));
        assert_eq!(gate.check(None).await, Err(BotCheckError::Missing));
        assert_eq!(gate.check(Some("   ")).await, Err(BotCheckError::Missing));
        assert_eq!(gate.check(Some("ok")).await, Ok(()));
    }

    #[tokio::test]
    async fn rejection_is_propagated() {
        let gate = BotGate::new(Arc::new(Fixed(false)));
        assert_eq!(gate.check(Some("nope")).await, Err(BotCheckError::Rejected));
    }
}
