//! Liveness endpoint.

use axum::Json;
use axum::extract::State;
use tracing::warn;

use salon_core::store::AdminUserStore;

use crate::AppState;
use crate::models::HealthResponse;

/// `GET /api/health`: reports version and store reachability.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_connected = match state.users.ping().await {
        Ok(()) => true,
        Err(e) => {
            warn!("store ping failed: {e}");
            false
        }
    };

    Json(HealthResponse {
        status: "ok".into(),
        version: salon_core::version().to_string(),
        store_connected,
    })
}
