use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::db::{member_repo, position_repo, trade_repo};
use crate::errors::AppError;
use crate::models::{Position, Trade};
use crate::AppState;

use super::ApiResponse;

pub async fn get_positions(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Position>>>, AppError> {
    member_repo::get_member(&state.db, member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("League member not found".into()))?;

    let positions = position_repo::get_positions_by_member(&state.db, member_id).await?;

    Ok(Json(ApiResponse::ok(positions)))
}

pub async fn get_trades(
    State(state): State<AppState>,
    Path(member_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<Trade>>>, AppError> {
    member_repo::get_member(&state.db, member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("League member not found".into()))?;

    let trades = trade_repo::get_trades_by_member(&state.db, member_id).await?;

    Ok(Json(ApiResponse::ok(trades)))
}
