use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Probe the assignment store, reporting degraded while it is unreachable.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.engine().store_health().await {
        Ok(()) => HealthResponse::ok(),
        Err(err) => {
            warn!(backend = err.backend(), error = %err, "storage health check failed");
            HealthResponse::degraded()
        }
    }
}
