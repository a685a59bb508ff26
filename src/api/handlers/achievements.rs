use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::achievement_repo;
use crate::errors::AppError;
use crate::models::Achievement;
use crate::services::achievements;
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct CheckQuery {
    pub league_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub achievements_awarded: Vec<String>,
}

/// Evaluate achievement rules for a user and award anything newly earned.
pub async fn check_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(query): Query<CheckQuery>,
) -> Result<Json<ApiResponse<CheckResult>>, AppError> {
    let awarded = achievements::check_user(&state.db, user_id, query.league_id)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(ApiResponse::ok(CheckResult {
        achievements_awarded: awarded,
    })))
}

pub async fn get_achievements(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Achievement>>>, AppError> {
    let achievements = achievement_repo::get_achievements_by_user(&state.db, user_id).await?;

    Ok(Json(ApiResponse::ok(achievements)))
}
