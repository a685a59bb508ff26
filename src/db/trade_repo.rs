use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::Trade;

/// Append a trade to the immutable log.
#[allow(clippy::too_many_arguments)]
pub async fn insert_trade(
    executor: impl PgExecutor<'_>,
    member_id: Uuid,
    market_id: &str,
    market_slug: Option<&str>,
    market_question: &str,
    trade_type: &str,
    outcome: &str,
    shares: Decimal,
    price: Decimal,
    total_value: Decimal,
    pnl: Option<Decimal>,
    days_to_resolution: Option<Decimal>,
) -> anyhow::Result<Trade> {
    let trade = sqlx::query_as::<_, Trade>(
        r#"
        INSERT INTO trades
            (league_member_id, market_id, market_slug, market_question, trade_type,
             outcome, shares, price, total_value, pnl, days_to_resolution)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING *
        "#,
    )
    .bind(member_id)
    .bind(market_id)
    .bind(market_slug)
    .bind(market_question)
    .bind(trade_type)
    .bind(outcome)
    .bind(shares)
    .bind(price)
    .bind(total_value)
    .bind(pnl)
    .bind(days_to_resolution)
    .fetch_one(executor)
    .await?;

    Ok(trade)
}

/// Trade history for a member, newest first.
pub async fn get_trades_by_member(pool: &PgPool, member_id: Uuid) -> anyhow::Result<Vec<Trade>> {
    let trades = sqlx::query_as::<_, Trade>(
        "SELECT * FROM trades WHERE league_member_id = $1 ORDER BY created_at DESC",
    )
    .bind(member_id)
    .fetch_all(pool)
    .await?;

    Ok(trades)
}

/// Sell-side stats for the win-rate aggregate: (total sells, profitable
/// sells). Settles realize pnl the same way sells do, so both count.
pub async fn sell_stats(executor: impl PgExecutor<'_>, member_id: Uuid) -> anyhow::Result<(i64, i64)> {
    let row: (i64, i64) = sqlx::query_as(
        r#"
        SELECT COUNT(*), COUNT(*) FILTER (WHERE pnl > 0)
        FROM trades
        WHERE league_member_id = $1 AND trade_type IN ('sell', 'settle')
        "#,
    )
    .bind(member_id)
    .fetch_one(executor)
    .await?;

    Ok(row)
}

/// Realized results for scoring, oldest first.
pub async fn get_realized_results(
    pool: &PgPool,
    member_id: Uuid,
) -> anyhow::Result<Vec<(Decimal, Option<Decimal>)>> {
    let rows: Vec<(Decimal, Option<Decimal>)> = sqlx::query_as(
        r#"
        SELECT pnl, days_to_resolution
        FROM trades
        WHERE league_member_id = $1 AND pnl IS NOT NULL
        ORDER BY created_at ASC
        "#,
    )
    .bind(member_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
