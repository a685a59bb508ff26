use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::models::LeagueMember;

/// Add a user to a league with a fresh balance. The (league, user) unique
/// index rejects double joins.
pub async fn create_member(
    pool: &PgPool,
    league_id: Uuid,
    user_id: Uuid,
    starting_capital: Decimal,
) -> anyhow::Result<LeagueMember> {
    let member = sqlx::query_as::<_, LeagueMember>(
        r#"
        INSERT INTO league_members (league_id, user_id, current_balance, total_pnl, total_trades, win_rate)
        VALUES ($1, $2, $3, 0, 0, 0)
        RETURNING *
        "#,
    )
    .bind(league_id)
    .bind(user_id)
    .bind(starting_capital)
    .fetch_one(pool)
    .await?;

    Ok(member)
}

pub async fn get_member(pool: &PgPool, id: Uuid) -> anyhow::Result<Option<LeagueMember>> {
    let member = sqlx::query_as::<_, LeagueMember>("SELECT * FROM league_members WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(member)
}

/// Lock the member row for the duration of the enclosing transaction.
/// Trades against the same membership serialize on this lock, so two
/// concurrent buys cannot both pass the balance check on a stale read.
pub async fn get_member_for_update(
    executor: impl PgExecutor<'_>,
    id: Uuid,
) -> anyhow::Result<Option<LeagueMember>> {
    let member =
        sqlx::query_as::<_, LeagueMember>("SELECT * FROM league_members WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;

    Ok(member)
}

/// League leaderboard snapshot, best rank first.
pub async fn get_members_by_league(
    pool: &PgPool,
    league_id: Uuid,
) -> anyhow::Result<Vec<LeagueMember>> {
    let members = sqlx::query_as::<_, LeagueMember>(
        r#"
        SELECT * FROM league_members
        WHERE league_id = $1
        ORDER BY rank ASC NULLS LAST, total_pnl DESC, joined_at ASC
        "#,
    )
    .bind(league_id)
    .fetch_all(pool)
    .await?;

    Ok(members)
}

pub async fn find_membership(
    pool: &PgPool,
    league_id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<Option<LeagueMember>> {
    let member = sqlx::query_as::<_, LeagueMember>(
        "SELECT * FROM league_members WHERE league_id = $1 AND user_id = $2",
    )
    .bind(league_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(member)
}

/// All memberships for a user, optionally narrowed to one league.
pub async fn get_memberships_by_user(
    pool: &PgPool,
    user_id: Uuid,
    league_id: Option<Uuid>,
) -> anyhow::Result<Vec<LeagueMember>> {
    let members = match league_id {
        Some(league_id) => {
            sqlx::query_as::<_, LeagueMember>(
                "SELECT * FROM league_members WHERE user_id = $1 AND league_id = $2",
            )
            .bind(user_id)
            .bind(league_id)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, LeagueMember>("SELECT * FROM league_members WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(pool)
                .await?
        }
    };

    Ok(members)
}

/// Rewrite the materialized ledger aggregates after a trade.
pub async fn update_aggregates(
    executor: impl PgExecutor<'_>,
    id: Uuid,
    current_balance: Decimal,
    total_pnl: Decimal,
    total_trades: i32,
    win_rate: Decimal,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE league_members
        SET current_balance = $2, total_pnl = $3, total_trades = $4, win_rate = $5
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(current_balance)
    .bind(total_pnl)
    .bind(total_trades)
    .bind(win_rate)
    .execute(executor)
    .await?;

    Ok(())
}

pub async fn set_rank(pool: &PgPool, id: Uuid, rank: i32) -> anyhow::Result<()> {
    sqlx::query("UPDATE league_members SET rank = $2 WHERE id = $1")
        .bind(id)
        .bind(rank)
        .execute(pool)
        .await?;

    Ok(())
}
