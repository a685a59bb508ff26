use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the achievements table. Append-only; one badge per
/// (user, league, achievement_type).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub league_id: Uuid,
    pub achievement_type: String,
    pub title: String,
    pub description: String,
    pub created_at: Option<DateTime<Utc>>,
}
