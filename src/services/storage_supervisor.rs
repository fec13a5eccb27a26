use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{game_store::GameStore, storage::StorageError},
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Connect to the storage backend and keep the shared state in degraded mode while it is unavailable.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn GameStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_game_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                if !watch_health(&state, store.as_ref()).await {
                    warn!("exhausted storage reconnect attempts; dropping the connection");
                    state.clear_game_store().await;
                }

                sleep(delay).await;
                delay = next_delay(delay);
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = next_delay(delay);
            }
        }
    }
}

/// Poll the store until it stays unreachable after every reconnect attempt.
///
/// Returns `false` once the connection is considered lost.
async fn watch_health(state: &SharedState, store: &dyn GameStore) -> bool {
    loop {
        match store.health_check().await {
            Ok(()) => {
                if state.is_degraded() {
                    info!("storage healthy again; leaving degraded mode");
                    state.update_degraded(false);
                }
                sleep(HEALTH_POLL_INTERVAL).await;
            }
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                if !reconnect(state, store).await {
                    return false;
                }
                state.update_degraded(false);
                sleep(HEALTH_POLL_INTERVAL).await;
            }
        }
    }
}

async fn reconnect(state: &SharedState, store: &dyn GameStore) -> bool {
    let mut delay = INITIAL_DELAY;

    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "storage reconnection succeeded after health check failure");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(
                        attempt, error = %err,
                        "storage reconnect first attempt failed; entering degraded mode"
                    );
                    state.update_degraded(true);
                } else {
                    warn!(attempt, error = %err, "storage reconnect attempt failed");
                }
                sleep(delay).await;
                delay = next_delay(delay);
            }
        }
    }

    false
}

fn next_delay(current: Duration) -> Duration {
    (current * 2).min(MAX_DELAY)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::future::BoxFuture;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{GameRecord, StoredGame},
            storage::{StorageResult, StorageTarget, StoreCredential},
        },
        state::AppState,
    };

    struct FlakyStore {
        healthy: bool,
        reconnects: AtomicUsize,
    }

    fn offline() -> StorageError {
        StorageError::unavailable("offline".into(), std::io::Error::other("offline"))
    }

    impl GameStore for FlakyStore {
        fn create_document(
            &self,
            _target: StorageTarget,
            _document_id: Uuid,
            _record: GameRecord,
            _credential: Option<StoreCredential>,
        ) -> BoxFuture<'static, StorageResult<StoredGame>> {
            Box::pin(async { Err(offline()) })
        }

        fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
            let healthy = self.healthy;
            Box::pin(async move { if healthy { Ok(()) } else { Err(offline()) } })
        }

        fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
            self.reconnects.fetch_add(1, Ordering::SeqCst);
            Box::pin(async { Err(offline()) })
        }
    }

    #[test]
    fn backoff_is_capped() {
        assert_eq!(next_delay(INITIAL_DELAY), Duration::from_secs(2));
        assert_eq!(next_delay(Duration::from_secs(8)), MAX_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reconnects_report_connection_lost() {
        let state = AppState::new(AppConfig::default());
        let store = FlakyStore {
            healthy: false,
            reconnects: AtomicUsize::new(0),
        };

        assert!(!watch_health(&state, &store).await);
        assert_eq!(
            store.reconnects.load(Ordering::SeqCst),
            MAX_RECONNECT_ATTEMPTS as usize
        );
        assert!(state.is_degraded());
    }

    #[tokio::test(start_paused = true)]
    async fn supervisor_installs_connected_store() {
        let state = AppState::new(AppConfig::default());
        let task = tokio::spawn(run(state.clone(), || async {
            let store: Arc<dyn GameStore> = Arc::new(FlakyStore {
                healthy: true,
                reconnects: AtomicUsize::new(0),
            });
            Ok(store)
        }));

        tokio::task::yield_now().await;
        for _ in 0..10 {
            if !state.is_degraded() {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert!(!state.is_degraded());
        assert!(state.game_store().await.is_some());
        task.abort();
    }
}
