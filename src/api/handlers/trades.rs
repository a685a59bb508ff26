use axum::{extract::State, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Outcome, Trade, TradeType};
use crate::services::trade_exec::{self, TradeOrder};
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct TradeRequest {
    pub league_member_id: Uuid,
    pub market_id: String,
    pub market_slug: Option<String>,
    pub market_question: String,
    pub trade_type: String,
    pub outcome: String,
    pub shares: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TradeResponse {
    pub trade: Trade,
    pub new_balance: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pnl: Option<Decimal>,
}

pub async fn execute_trade(
    State(state): State<AppState>,
    Json(req): Json<TradeRequest>,
) -> Result<Json<ApiResponse<TradeResponse>>, AppError> {
    // Settlements are system-initiated, never accepted over the API.
    let trade_type = match TradeType::from_api_str(&req.trade_type) {
        Some(t @ (TradeType::Buy | TradeType::Sell)) => t,
        _ => {
            return Err(AppError::BadRequest(format!(
                "Invalid trade type: {}",
                req.trade_type
            )))
        }
    };

    let outcome = Outcome::from_api_str(&req.outcome)
        .ok_or_else(|| AppError::BadRequest(format!("Invalid outcome: {}", req.outcome)))?;

    if req.market_id.trim().is_empty() {
        return Err(AppError::BadRequest("Market ID is required".into()));
    }

    let order = TradeOrder {
        league_member_id: req.league_member_id,
        market_id: req.market_id,
        market_slug: req.market_slug,
        market_question: req.market_question,
        trade_type,
        outcome,
        shares: req.shares,
        price: req.price,
    };

    let executed = trade_exec::execute_trade(&state.db, &state.gamma, &order).await?;

    Ok(Json(ApiResponse::ok(TradeResponse {
        trade: executed.trade,
        new_balance: executed.new_balance,
        pnl: executed.realized_pnl,
    })))
}
