use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

use super::ApiResponse;

/// Report the background poller configuration.
pub async fn task_status(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    let cfg = &state.config;

    Json(ApiResponse::ok(json!({
        "pollers_enabled": cfg.pollers_enabled,
        "tasks": [
            {
                "name": "price_updater",
                "interval_secs": cfg.price_update_interval_secs,
            },
            {
                "name": "settlement",
                "interval_secs": cfg.settlement_interval_secs,
            },
            {
                "name": "rankings",
                "interval_secs": cfg.ranking_interval_secs,
            },
        ],
    })))
}
