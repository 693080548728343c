use anyhow::Context;

use backoffice_infra::config::AppConfig;
use backoffice_infra::workers::RevocationSweeper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    backoffice_observability::init();

    let cfg = AppConfig::from_env().context("loading configuration")?;

    let services = backoffice_api::app::build_services(&cfg).await?;
    let sweeper = RevocationSweeper::spawn(
        services.lifecycle.ledger().clone(),
        cfg.revocation_sweep_interval,
    );

    let app = backoffice_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", cfg.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("server error")?;

    sweeper.shutdown().await;
    Ok(())
}
