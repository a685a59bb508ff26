use sqlx::PgPool;
use uuid::Uuid;

use crate::models::Achievement;

pub async fn has_achievement(
    pool: &PgPool,
    user_id: Uuid,
    league_id: Uuid,
    achievement_type: &str,
) -> anyhow::Result<bool> {
    let row: (i64,) = sqlx::query_as(
        r#"
        SELECT COUNT(*) FROM achievements
        WHERE user_id = $1 AND league_id = $2 AND achievement_type = $3
        "#,
    )
    .bind(user_id)
    .bind(league_id)
    .bind(achievement_type)
    .fetch_one(pool)
    .await?;

    Ok(row.0 > 0)
}

/// Award a badge. The unique index on (user, league, type) makes repeat
/// awards a no-op at the database level.
pub async fn award_achievement(
    pool: &PgPool,
    user_id: Uuid,
    league_id: Uuid,
    achievement_type: &str,
    title: &str,
    description: &str,
) -> anyhow::Result<Option<Achievement>> {
    let achievement = sqlx::query_as::<_, Achievement>(
        r#"
        INSERT INTO achievements (user_id, league_id, achievement_type, title, description)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id, league_id, achievement_type) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(league_id)
    .bind(achievement_type)
    .bind(title)
    .bind(description)
    .fetch_optional(pool)
    .await?;

    Ok(achievement)
}

pub async fn get_achievements_by_user(
    pool: &PgPool,
    user_id: Uuid,
) -> anyhow::Result<Vec<Achievement>> {
    let achievements = sqlx::query_as::<_, Achievement>(
        "SELECT * FROM achievements WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(achievements)
}
