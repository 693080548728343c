use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use backoffice_auth::{
    AccountLifecycle, AccountStore, AuthConfig, BotGate, Mailer, RevocationStore, SessionGuard,
};
use backoffice_infra::{
    bot::RecaptchaVerifier,
    config::AppConfig,
    mail::{BrevoMailer, LogMailer},
    store::{
        InMemoryAccountStore, InMemoryRevocationStore, PostgresAccountStore,
        PostgresRevocationStore, ensure_schema,
    },
};

/// Everything the handlers need, shared behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AuthServices {
    pub lifecycle: AccountLifecycle,
    pub guard: SessionGuard,
    pub bot: BotGate,
}

impl AuthServices {
    pub fn new(
        config: Arc<AuthConfig>,
        accounts: Arc<dyn AccountStore>,
        revocations: Arc<dyn RevocationStore>,
        mailer: Arc<dyn Mailer>,
        bot: BotGate,
    ) -> Self {
        let lifecycle = AccountLifecycle::new(config, accounts, revocations, mailer);
        let guard = lifecycle.session_guard();
        Self {
            lifecycle,
            guard,
            bot,
        }
    }

    /// In-memory stores; used for local runs without `DATABASE_URL` and in tests.
    pub fn in_memory(config: Arc<AuthConfig>, mailer: Arc<dyn Mailer>, bot: BotGate) -> Self {
        Self::new(
            config,
            InMemoryAccountStore::arc(),
            InMemoryRevocationStore::arc(),
            mailer,
            bot,
        )
    }
}

/// Wire stores, mailer and bot gate from process configuration.
pub async fn build_services(cfg: &AppConfig) -> anyhow::Result<AuthServices> {
    let mailer: Arc<dyn Mailer> = match &cfg.brevo {
        Some(settings) => {
            Arc::new(BrevoMailer::new(settings.clone()).context("configuring Brevo mailer")?)
        }
        None => {
            warn!("BREVO_API_KEY not set; activation mail will only be logged");
            Arc::new(LogMailer::new(cfg.backend_url.clone()))
        }
    };

    let bot = match &cfg.recaptcha_secret {
        Some(secret) => BotGate::new(Arc::new(
            RecaptchaVerifier::new(secret.clone()).context("configuring reCAPTCHA")?,
        )),
        None => {
            warn!("RECAPTCHA_SECRET_KEY not set; bot verification disabled");
            BotGate::disabled()
        }
    };

    let services = match &cfg.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(url)
                .await
                .context("connecting to Postgres")?;
            ensure_schema(&pool).await.context("applying schema")?;
            info!("using Postgres stores");
            AuthServices::new(
                cfg.auth.clone(),
                Arc::new(PostgresAccountStore::new(pool.clone())),
                Arc::new(PostgresRevocationStore::new(pool)),
                mailer,
                bot,
            )
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory stores (data is lost on restart)");
            AuthServices::in_memory(cfg.auth.clone(), mailer, bot)
        }
    };

    Ok(services)
}
