use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::Position;

/// Fetch one (member, market, outcome) position inside a trade
/// transaction; the member row lock already serializes access.
pub async fn get_position(
    executor: impl PgExecutor<'_>,
    member_id: Uuid,
    market_id: &str,
    outcome: &str,
) -> anyhow::Result<Option<Position>> {
    let position = sqlx::query_as::<_, Position>(
        r#"
        SELECT * FROM positions
        WHERE league_member_id = $1 AND market_id = $2 AND outcome = $3
        LIMIT 1
        "#,
    )
    .bind(member_id)
    .bind(market_id)
    .bind(outcome)
    .fetch_optional(executor)
    .await?;

    Ok(position)
}

#[allow(clippy::too_many_arguments)]
pub async fn insert_position(
    executor: impl PgExecutor<'_>,
    member_id: Uuid,
    market_id: &str,
    market_slug: Option<&str>,
    market_question: &str,
    outcome: &str,
    shares: Decimal,
    entry_price: Decimal,
    market_end_date: Option<DateTime<Utc>>,
) -> anyhow::Result<Position> {
    let position = sqlx::query_as::<_, Position>(
        r#"
        INSERT INTO positions
            (league_member_id, market_id, market_slug, market_question, outcome,
             shares, entry_price, current_price, unrealized_pnl, market_end_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $7, 0, $8)
        RETURNING *
        "#,
    )
    .bind(member_id)
    .bind(market_id)
    .bind(market_slug)
    .bind(market_question)
    .bind(outcome)
    .bind(shares)
    .bind(entry_price)
    .bind(market_end_date)
    .fetch_one(executor)
    .await?;

    Ok(position)
}

/// Rewrite shares and the weighted-average entry after a buy or partial
/// sell; unrealized pnl is re-derived from the last known price.
pub async fn update_holding(
    executor: impl PgExecutor<'_>,
    id: Uuid,
    shares: Decimal,
    entry_price: Decimal,
) -> anyhow::Result<Position> {
    let position = sqlx::query_as::<_, Position>(
        r#"
        UPDATE positions
        SET shares = $2,
            entry_price = $3,
            unrealized_pnl = (COALESCE(current_price, $3) - $3) * $2,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(shares)
    .bind(entry_price)
    .fetch_one(executor)
    .await?;

    Ok(position)
}

pub async fn delete_position(executor: impl PgExecutor<'_>, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("DELETE FROM positions WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(())
}

pub async fn get_positions_by_member(
    pool: &PgPool,
    member_id: Uuid,
) -> anyhow::Result<Vec<Position>> {
    let positions = sqlx::query_as::<_, Position>(
        "SELECT * FROM positions WHERE league_member_id = $1 ORDER BY opened_at DESC",
    )
    .bind(member_id)
    .fetch_all(pool)
    .await?;

    Ok(positions)
}

pub async fn get_positions_for_market(
    pool: &PgPool,
    market_id: &str,
) -> anyhow::Result<Vec<Position>> {
    let positions =
        sqlx::query_as::<_, Position>("SELECT * FROM positions WHERE market_id = $1")
            .bind(market_id)
            .fetch_all(pool)
            .await?;

    Ok(positions)
}

/// Distinct markets with at least one open position; the price and
/// settlement pollers fetch each market once.
pub async fn get_open_market_ids(pool: &PgPool) -> anyhow::Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT market_id FROM positions")
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn update_market_price(
    pool: &PgPool,
    id: Uuid,
    current_price: Decimal,
    unrealized_pnl: Decimal,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE positions
        SET current_price = $2, unrealized_pnl = $3, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(current_price)
    .bind(unrealized_pnl)
    .execute(pool)
    .await?;

    Ok(())
}

/// Count open positions.
pub async fn count_open_positions(pool: &PgPool) -> anyhow::Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM positions")
        .fetch_one(pool)
        .await?;

    Ok(row.0)
}
