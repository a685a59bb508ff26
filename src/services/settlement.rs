use metrics::counter;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::db::{league_repo, member_repo, position_repo, trade_repo};
use crate::ledger::{self, LeagueRules, MemberState, Order};
use crate::models::{Outcome, Position, TradeType};
use crate::polymarket::{normalize, GammaClient};

/// Scan markets with open positions; when a market is closed with a
/// declared winner, pay out every position on it. Markets that fail to
/// fetch are retried on the next pass.
pub async fn settle_resolved_markets(pool: &PgPool, gamma: &GammaClient) -> anyhow::Result<usize> {
    let market_ids = position_repo::get_open_market_ids(pool).await?;
    let mut settled = 0usize;

    for market_id in &market_ids {
        let raw = match gamma.get_market(market_id).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, market_id, "Market fetch failed — will retry");
                continue;
            }
        };

        if raw.closed != Some(true) {
            continue;
        }

        let Some(winner) = normalize::winning_outcome(&raw) else {
            // Closed but no winner declared yet.
            continue;
        };

        tracing::info!(market_id, winner = %winner, "Market resolved");

        let positions = position_repo::get_positions_for_market(pool, market_id).await?;
        for position in &positions {
            match settle_position(pool, position, winner).await {
                Ok(pnl) => {
                    settled += 1;
                    counter!("positions_settled_total").increment(1);
                    tracing::info!(
                        position_id = %position.id,
                        market_id,
                        pnl = %pnl,
                        "Position settled"
                    );
                }
                Err(e) => {
                    tracing::error!(error = %e, position_id = %position.id, "Failed to settle position");
                }
            }
        }
    }

    Ok(settled)
}

/// Pay out one position: 1.0 per share on the winning outcome, 0 on the
/// losing one. Runs in its own transaction with the member row locked, so
/// a concurrent trade cannot race the payout.
async fn settle_position(
    pool: &PgPool,
    position: &Position,
    winner: Outcome,
) -> anyhow::Result<Decimal> {
    let held = Outcome::from_api_str(&position.outcome)
        .ok_or_else(|| anyhow::anyhow!("unknown outcome {}", position.outcome))?;
    let payout = if held == winner {
        Decimal::ONE
    } else {
        Decimal::ZERO
    };

    let mut tx = pool.begin().await?;

    let member = member_repo::get_member_for_update(&mut *tx, position.league_member_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("member {} not found", position.league_member_id))?;

    let league = league_repo::get_league(pool, member.league_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("league {} not found", member.league_id))?;

    let rules = LeagueRules {
        starting_capital: league.starting_capital,
        max_position_size: league.max_position_size,
        allowed_categories: league.allowed_categories,
    };

    let state = MemberState::from_parts(
        member.current_balance,
        member.total_pnl,
        member.total_trades as i64,
        0,
        0,
        [(
            position.market_id.clone(),
            held,
            position.shares,
            position.entry_price,
        )],
    );

    let order = Order {
        market_id: position.market_id.clone(),
        outcome: held,
        kind: TradeType::Settle,
        shares: position.shares,
        price: payout,
    };

    let applied = ledger::apply_trade(&rules, &state, &order)?;
    let pnl = applied
        .realized_pnl
        .ok_or_else(|| anyhow::anyhow!("settle produced no realized pnl"))?;

    trade_repo::insert_trade(
        &mut *tx,
        member.id,
        &position.market_id,
        position.market_slug.as_deref(),
        &position.market_question,
        TradeType::Settle.as_str(),
        held.as_str(),
        position.shares,
        payout,
        applied.total_value,
        Some(pnl),
        super::trade_exec::entry_days_to_resolution(position),
    )
    .await?;

    position_repo::delete_position(&mut *tx, position.id).await?;

    let (sells, profitable) = trade_repo::sell_stats(&mut *tx, member.id).await?;
    let win_rate = if sells == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(profitable) / Decimal::from(sells) * Decimal::ONE_HUNDRED
    };

    member_repo::update_aggregates(
        &mut *tx,
        member.id,
        applied.state.balance,
        applied.state.total_pnl,
        member.total_trades + 1,
        win_rate,
    )
    .await?;

    tx.commit().await?;

    Ok(pnl)
}

/// Periodically poll open markets and settle positions when outcomes are
/// known.
pub async fn run_settlement_poller(pool: PgPool, gamma: GammaClient, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;
        tracing::debug!("Settlement poller: checking open markets");

        match settle_resolved_markets(&pool, &gamma).await {
            Ok(0) => {}
            Ok(settled) => tracing::info!(settled, "Settlement pass complete"),
            Err(e) => tracing::error!(error = %e, "Settlement pass failed"),
        }
    }
}
