use std::time::Duration;

use chrono::Utc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use backoffice_auth::RevocationLedger;

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    shutdown: Option<oneshot::Sender<()>>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Request graceful shutdown and wait for the worker to stop.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.join.await {
            warn!(error = %e, "worker task ended abnormally");
        }
    }
}

/// Periodically removes revocation records whose tokens have expired.
///
/// Such tokens already fail signature verification on their own, so their
/// records no longer contribute to rejection.
#[derive(Debug)]
pub struct RevocationSweeper;

impl RevocationSweeper {
    pub fn spawn(ledger: RevocationLedger, every: Duration) -> WorkerHandle {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let join = tokio::spawn(sweep_loop(ledger, every, shutdown_rx));
        WorkerHandle {
            shutdown: Some(shutdown_tx),
            join,
        }
    }
}

async fn sweep_loop(ledger: RevocationLedger, every: Duration, mut shutdown_rx: oneshot::Receiver<()>) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut shutdown_rx => break,
            _ = ticker.tick() => {
                match ledger.purge_expired(Utc::now()).await {
                    Ok(0) => debug!("revocation sweep: nothing to purge"),
                    Ok(n) => info!(purged = n, "revocation sweep"),
                    Err(e) => warn!(error = %e, "revocation sweep failed"),
                }
            }
        }
    }
    debug!("revocation sweeper stopped");
}
