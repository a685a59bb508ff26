use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::services::{price_updater, settlement};
use crate::AppState;

use super::ApiResponse;

/// Kick off a mark-to-market pass in the background.
pub async fn update_prices(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    let pool = state.db.clone();
    let gamma = state.gamma.clone();
    tokio::spawn(async move {
        if let Err(e) = price_updater::update_all_positions(&pool, &gamma).await {
            tracing::error!(error = %e, "Manual price update failed");
        }
    });

    Json(ApiResponse::ok(json!({ "status": "price update started" })))
}

/// Kick off a settlement pass in the background.
pub async fn settle(State(state): State<AppState>) -> Json<ApiResponse<Value>> {
    let pool = state.db.clone();
    let gamma = state.gamma.clone();
    tokio::spawn(async move {
        if let Err(e) = settlement::settle_resolved_markets(&pool, &gamma).await {
            tracing::error!(error = %e, "Manual settlement pass failed");
        }
    });

    Json(ApiResponse::ok(json!({ "status": "settlement started" })))
}
