use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::League;

/// Insert a new league.
#[allow(clippy::too_many_arguments)]
pub async fn create_league(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    commissioner_id: Uuid,
    is_public: bool,
    invite_code: Option<&str>,
    starting_capital: Decimal,
    max_position_size: Decimal,
    scoring_type: &str,
    conviction_curve: Option<&str>,
    conviction_rate: Option<Decimal>,
    allowed_categories: &[String],
) -> anyhow::Result<League> {
    let league = sqlx::query_as::<_, League>(
        r#"
        INSERT INTO leagues
            (name, description, commissioner_id, is_public, invite_code,
             starting_capital, max_position_size, scoring_type,
             conviction_curve, conviction_rate, allowed_categories, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, 'active')
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(description)
    .bind(commissioner_id)
    .bind(is_public)
    .bind(invite_code)
    .bind(starting_capital)
    .bind(max_position_size)
    .bind(scoring_type)
    .bind(conviction_curve)
    .bind(conviction_rate)
    .bind(allowed_categories)
    .fetch_one(pool)
    .await?;

    Ok(league)
}

pub async fn get_league(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<League>> {
    let league = sqlx::query_as::<_, League>("SELECT * FROM leagues WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(league)
}

/// All leagues currently accepting trades.
pub async fn get_active_leagues(pool: &PgPool) -> anyhow::Result<Vec<League>> {
    let leagues = sqlx::query_as::<_, League>(
        "SELECT * FROM leagues WHERE status = 'active' ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(leagues)
}

/// Used to roll back league creation when the commissioner membership
/// insert fails; memberships cascade.
pub async fn delete_league(pool: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM leagues WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
