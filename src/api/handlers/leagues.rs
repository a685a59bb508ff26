use axum::{
    extract::{Path, State},
    Json,
};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{league_repo, member_repo};
use crate::errors::AppError;
use crate::ledger::TradeError;
use crate::models::{League, LeagueMember, ScoringType};
use crate::services::rankings;
use crate::AppState;

use super::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct CreateLeagueRequest {
    pub name: String,
    pub description: Option<String>,
    pub commissioner_id: Uuid,
    #[serde(default = "default_public")]
    pub is_public: bool,
    pub starting_capital: Decimal,
    pub max_position_size: Decimal,
    #[serde(default = "default_scoring")]
    pub scoring_type: String,
    pub conviction_curve: Option<String>,
    pub conviction_rate: Option<Decimal>,
    #[serde(default)]
    pub allowed_categories: Vec<String>,
}

fn default_public() -> bool {
    true
}

fn default_scoring() -> String {
    "standard".to_string()
}

#[derive(Debug, Serialize)]
pub struct CreateLeagueResponse {
    pub league: League,
    pub commissioner_membership: LeagueMember,
}

pub async fn create_league(
    State(state): State<AppState>,
    Json(req): Json<CreateLeagueRequest>,
) -> Result<Json<ApiResponse<CreateLeagueResponse>>, AppError> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("League name is required".into()));
    }
    if req.starting_capital <= Decimal::ZERO {
        return Err(AppError::BadRequest(
            "Starting capital must be positive".into(),
        ));
    }
    if req.max_position_size <= Decimal::ZERO || req.max_position_size > Decimal::ONE_HUNDRED {
        return Err(AppError::BadRequest(
            "Max position size must be between 0 and 100 percent".into(),
        ));
    }
    let scoring = ScoringType::from_api_str(&req.scoring_type)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown scoring type: {}", req.scoring_type)))?;

    let invite_code = if req.is_public {
        None
    } else {
        Some(generate_invite_code())
    };

    let league = league_repo::create_league(
        &state.db,
        req.name.trim(),
        req.description.as_deref(),
        req.commissioner_id,
        req.is_public,
        invite_code.as_deref(),
        req.starting_capital,
        req.max_position_size,
        scoring.as_str(),
        req.conviction_curve.as_deref(),
        req.conviction_rate,
        &req.allowed_categories,
    )
    .await?;

    // The commissioner joins their own league immediately. If that insert
    // fails the league row is rolled back rather than left empty.
    let membership =
        match member_repo::create_member(&state.db, league.id, req.commissioner_id, req.starting_capital)
            .await
        {
            Ok(m) => m,
            Err(e) => {
                if let Err(del) = league_repo::delete_league(&state.db, league.id).await {
                    tracing::error!(error = %del, league_id = %league.id, "Failed to roll back league");
                }
                return Err(AppError::Internal(e));
            }
        };

    tracing::info!(league_id = %league.id, name = %league.name, "League created");

    Ok(Json(ApiResponse::ok(CreateLeagueResponse {
        league,
        commissioner_membership: membership,
    })))
}

/// 8 uppercase hex characters, e.g. "A1B2C3D4".
fn generate_invite_code() -> String {
    let bytes: [u8; 4] = rand::thread_rng().gen();
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

#[derive(Debug, Deserialize)]
pub struct JoinLeagueRequest {
    pub user_id: Uuid,
    pub invite_code: Option<String>,
}

pub async fn join_league(
    State(state): State<AppState>,
    Path(league_id): Path<Uuid>,
    Json(req): Json<JoinLeagueRequest>,
) -> Result<Json<ApiResponse<LeagueMember>>, AppError> {
    let league = league_repo::get_league(&state.db, league_id)
        .await?
        .ok_or_else(|| AppError::NotFound("League not found".into()))?;

    if !league.is_public {
        let provided = req.invite_code.as_deref().unwrap_or_default();
        if league.invite_code.as_deref() != Some(provided) || provided.is_empty() {
            return Err(AppError::Trade(TradeError::InvalidInviteCode));
        }
    }

    if member_repo::find_membership(&state.db, league_id, req.user_id)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest(
            "User is already a member of this league".into(),
        ));
    }

    let member =
        member_repo::create_member(&state.db, league_id, req.user_id, league.starting_capital)
            .await?;

    tracing::info!(league_id = %league_id, user_id = %req.user_id, "Member joined league");

    Ok(Json(ApiResponse::ok(member)))
}

pub async fn get_league(
    State(state): State<AppState>,
    Path(league_id): Path<Uuid>,
) -> Result<Json<ApiResponse<League>>, AppError> {
    let league = league_repo::get_league(&state.db, league_id)
        .await?
        .ok_or_else(|| AppError::NotFound("League not found".into()))?;

    Ok(Json(ApiResponse::ok(league)))
}

pub async fn get_members(
    State(state): State<AppState>,
    Path(league_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<LeagueMember>>>, AppError> {
    league_repo::get_league(&state.db, league_id)
        .await?
        .ok_or_else(|| AppError::NotFound("League not found".into()))?;

    let members = member_repo::get_members_by_league(&state.db, league_id).await?;

    Ok(Json(ApiResponse::ok(members)))
}

#[derive(Debug, Serialize)]
pub struct RankingUpdateResult {
    pub members_updated: usize,
}

pub async fn update_rankings(
    State(state): State<AppState>,
    Path(league_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RankingUpdateResult>>, AppError> {
    league_repo::get_league(&state.db, league_id)
        .await?
        .ok_or_else(|| AppError::NotFound("League not found".into()))?;

    let members_updated = rankings::update_league_rankings(&state.db, league_id)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(ApiResponse::ok(RankingUpdateResult { members_updated })))
}

pub async fn update_all_rankings(
    State(state): State<AppState>,
) -> Json<ApiResponse<serde_json::Value>> {
    let pool = state.db.clone();
    tokio::spawn(async move {
        rankings::update_all_rankings(&pool).await;
    });

    Json(ApiResponse::ok(
        serde_json::json!({ "status": "ranking update started" }),
    ))
}
