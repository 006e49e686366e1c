use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::XrefEngine;
use crate::errors::{Result, XrefError};
use crate::types::RefreshResult;

/// Run one refresh on the blocking pool.
///
/// Store access is synchronous, so it must not run on a runtime worker.
pub async fn refresh_blocking(engine: Arc<XrefEngine>) -> Result<RefreshResult> {
    tokio::task::spawn_blocking(move || engine.refresh())
        .await
        .map_err(|e| XrefError::StoreUnavailable {
            message: format!("refresh task failed: {e}"),
        })?
}

/// Spawn a task that refreshes `engine` every `interval`.
///
/// A failed cycle is logged and the last good snapshot keeps serving; the
/// next tick tries again.
pub fn spawn_refresh_loop(engine: Arc<XrefEngine>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick completes immediately; the initial load already ran.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match refresh_blocking(engine.clone()).await {
                Ok(result) if result.changed => info!(
                    generation = result.generation,
                    records = result.record_count,
                    "periodic refresh published new snapshot"
                ),
                Ok(result) => debug!(
                    generation = result.generation,
                    "periodic refresh found no changes"
                ),
                Err(e) => warn!(error = %e, "periodic refresh failed; keeping previous snapshot"),
            }
        }
    })
}

/// Spawn a task that retries the initial load every `retry` until a snapshot
/// has been published, then exits.
///
/// Used when periodic refresh is disabled, so a store that is down at startup
/// is still picked up once it comes back.
pub fn spawn_initial_load(engine: Arc<XrefEngine>, retry: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(retry);
        ticker.tick().await;
        while !engine.current_snapshot().is_published() {
            ticker.tick().await;
            match refresh_blocking(engine.clone()).await {
                Ok(result) => info!(
                    generation = result.generation,
                    records = result.record_count,
                    "initial snapshot loaded after retry"
                ),
                Err(e) => warn!(error = %e, "initial snapshot load failed; retrying"),
            }
        }
    })
}
