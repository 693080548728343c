//! Process configuration loaded from the environment.
//!
//! Required values are checked here so a misconfigured process refuses to
//! start instead of failing on its first request.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use backoffice_auth::{AuthConfig, ConfigError};

use crate::mail::BrevoSettings;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080";
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);
/// Lowest work factor accepted from the environment.
pub const MIN_PROCESS_BCRYPT_COST: u32 = 12;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub auth: Arc<AuthConfig>,
    pub bind_addr: SocketAddr,
    pub database_url: Option<String>,
    pub backend_url: String,
    pub brevo: Option<BrevoSettings>,
    pub recaptcha_secret: Option<String>,
    pub revocation_sweep_interval: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let session_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let activation_secret =
            get("ACTIVATION_SECRET").ok_or(ConfigError::Missing("ACTIVATION_SECRET"))?;

        let mut auth = AuthConfig::new(session_secret, activation_secret)?;
        if let Some(secs) = parse::<u64>(&get, "JWT_EXPIRES_IN_SECS")? {
            auth = auth.with_session_ttl(Duration::from_secs(secs))?;
        }
        if let Some(secs) = parse::<u64>(&get, "ACTIVATION_EXPIRES_IN_SECS")? {
            auth = auth.with_activation_ttl(Duration::from_secs(secs))?;
        }
        if let Some(cost) = parse::<u32>(&get, "BCRYPT_COST")? {
            if cost < MIN_PROCESS_BCRYPT_COST {
                return Err(ConfigError::invalid(
                    "BCRYPT_COST",
                    format!("must be at least {MIN_PROCESS_BCRYPT_COST}"),
                ));
            }
            auth = auth.with_bcrypt_cost(cost)?;
        }

        let bind_addr = get("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("BIND_ADDR", e.to_string()))?;

        let backend_url = get("BACKEND_URL").unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());

        let brevo = match (get("BREVO_API_KEY"), get("BREVO_SENDER_EMAIL")) {
            (Some(api_key), Some(sender_email)) => Some(BrevoSettings {
                api_key,
                sender_email,
                sender_name: get("BREVO_SENDER_NAME"),
                backend_url: backend_url.clone(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing("BREVO_SENDER_EMAIL")),
            (None, Some(_)) => return Err(ConfigError::Missing("BREVO_API_KEY")),
        };

        let revocation_sweep_interval =
            match parse::<u64>(&get, "REVOCATION_SWEEP_INTERVAL_SECS")? {
                Some(0) => {
                    return Err(ConfigError::invalid(
                        "REVOCATION_SWEEP_INTERVAL_SECS",
                        "must be at least one second",
                    ));
                }
                Some(secs) => Duration::from_secs(secs),
                None => DEFAULT_SWEEP_INTERVAL,
            };

        Ok(Self {
            auth: Arc::new(auth),
            bind_addr,
            database_url: get("DATABASE_URL"),
            backend_url,
            brevo,
            recaptcha_secret: get("RECAPTCHA_SECRET_KEY"),
            revocation_sweep_interval,
        })
    }
}

fn parse<T>(get: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| ConfigError::invalid(key, e.to_string()))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRETS: [(&str, &str); 2] = [("JWT_SECRET", "s1"), ("ACTIVATION_SECRET", "s2")];

    #[test]
    fn defaults_apply_when_only_secrets_are_set() {
        let cfg = AppConfig::from_lookup(lookup(&SECRETS)).unwrap();
        assert_eq!(cfg.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(cfg.auth.session_ttl(), Duration::from_secs(3600));
        assert_eq!(cfg.auth.activation_ttl(), Duration::from_secs(86400));
        assert_eq!(cfg.auth.bcrypt_cost(), 12);
        assert!(cfg.database_url.is_none());
        assert!(cfg.brevo.is_none());
        assert!(cfg.recaptcha_secret.is_none());
        assert_eq!(cfg.revocation_sweep_interval, DEFAULT_SWEEP_INTERVAL);
    }

    #[test]
    fn missing_session_secret_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[("ACTIVATION_SECRET", "s2")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("JWT_SECRET"));
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "s1"), ("ACTIVATION_SECRET", "  ")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::Missing("ACTIVATION_SECRET"));
    }

    #[test]
    fn low_bcrypt_cost_is_rejected() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("BCRYPT_COST", "10"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "BCRYPT_COST", .. }));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = SECRETS.to_vec();
        pairs.extend([
            ("JWT_EXPIRES_IN_SECS", "120"),
            ("ACTIVATION_EXPIRES_IN_SECS", "600"),
            ("BCRYPT_COST", "13"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("DATABASE_URL", "postgres://localhost/auth"),
            ("RECAPTCHA_SECRET_KEY", "rc"),
            ("REVOCATION_SWEEP_INTERVAL_SECS", "30"),
        ]);
        let cfg = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        assert_eq!(cfg.auth.session_ttl(), Duration::from_secs(120));
        assert_eq!(cfg.auth.activation_ttl(), Duration::from_secs(600));
        assert_eq!(cfg.auth.bcrypt_cost(), 13);
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/auth"));
        assert_eq!(cfg.recaptcha_secret.as_deref(), Some("rc"));
        assert_eq!(cfg.revocation_sweep_interval, Duration::from_secs(30));
    }

    #[test]
    fn non_numeric_lifetime_is_invalid() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("JWT_EXPIRES_IN_SECS", "1h"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "JWT_EXPIRES_IN_SECS", .. }));
    }

    #[test]
    fn lifetime_beyond_the_cap_refuses_to_start() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("JWT_EXPIRES_IN_SECS", "18446744073709551615"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "session ttl", .. }));

        let mut pairs = SECRETS.to_vec();
        pairs.push(("ACTIVATION_EXPIRES_IN_SECS", "10000000000000"));
        let err = AppConfig::from_lookup(lookup(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "activation ttl", .. }));
    }

    #[test]
    fn brevo_requires_key_and_sender_together() {
        let mut pairs = SECRETS.to_vec();
        pairs.push(("BREVO_API_KEY", "k"));
        assert_eq!(
            AppConfig::from_lookup(lookup(&pairs)).unwrap_err(),
            ConfigError::Missing("BREVO_SENDER_EMAIL")
        );

        pairs.push(("BREVO_SENDER_EMAIL", "noreply@example.com"));
        pairs.push(("BACKEND_URL", "https://api.example.com"));
        let cfg = AppConfig::from_lookup(lookup(&pairs)).unwrap();
        let brevo = cfg.brevo.unwrap();
        assert_eq!(brevo.sender_email, "noreply@example.com");
        assert_eq!(brevo.backend_url, "https://api.example.com");
        assert!(brevo.sender_name.is_none());
    }
}
