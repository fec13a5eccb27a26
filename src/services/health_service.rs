use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report whether games can currently be created, logging storage issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.game_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        None => warn!("storage unavailable (degraded mode)"),
    }

    if let Err(err) = state.config().storage_target() {
        warn!(error = %err, "storage target not configured");
        return HealthResponse::degraded();
    }

    if state.is_degraded() {
        HealthResponse::degraded()
    } else {
        HealthResponse::ok()
    }
}
