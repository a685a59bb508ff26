use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{league_repo, member_repo, position_repo, trade_repo};
use crate::errors::AppError;
use crate::ledger::{self, LeagueRules, MemberState, Order};
use crate::models::{Outcome, Position, Trade, TradeType};
use crate::polymarket::normalize::clamp_price;
use crate::polymarket::{normalize, GammaClient};

/// A fully parsed trade order, ready for validation.
#[derive(Debug, Clone)]
pub struct TradeOrder {
    pub league_member_id: Uuid,
    pub market_id: String,
    pub market_slug: Option<String>,
    pub market_question: String,
    pub trade_type: TradeType,
    pub outcome: Outcome,
    pub shares: Decimal,
    pub price: Decimal,
}

#[derive(Debug, Clone)]
pub struct ExecutedTrade {
    pub trade: Trade,
    pub new_balance: Decimal,
    pub realized_pnl: Option<Decimal>,
}

/// Validate and execute one trade.
///
/// The whole update runs in a single transaction with the member row
/// locked (`SELECT ... FOR UPDATE`), so concurrent trades against the same
/// membership serialize and a trade either fully applies or not at all.
pub async fn execute_trade(
    pool: &PgPool,
    gamma: &GammaClient,
    order: &TradeOrder,
) -> Result<ExecutedTrade, AppError> {
    let started = std::time::Instant::now();

    let member = member_repo::get_member(pool, order.league_member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("League member not found".into()))?;

    let league = league_repo::get_league(pool, member.league_id)
        .await?
        .ok_or_else(|| AppError::NotFound("League not found".into()))?;

    let rules = LeagueRules {
        starting_capital: league.starting_capital,
        max_position_size: league.max_position_size,
        allowed_categories: league.allowed_categories.clone(),
    };

    // Category enforcement needs the live market record. When the league
    // restricts categories a feed failure hard-fails the trade; otherwise
    // the fetch is best-effort (it only supplies the market end date).
    let market = match gamma.get_market(&order.market_id).await {
        Ok(raw) => Some(normalize::normalize(&raw)),
        Err(e) if rules.allowed_categories.is_empty() => {
            tracing::warn!(error = %e, market_id = %order.market_id, "Market fetch failed; end date unknown");
            None
        }
        Err(e) => return Err(AppError::MarketDataUnavailable(e.to_string())),
    };
    let category = market.as_ref().map(|m| m.category.clone());
    let market_end_date = market.as_ref().and_then(|m| m.end_date);

    let mut tx = pool.begin().await.map_err(anyhow::Error::from)?;

    // Re-read under the row lock; the first read was only for routing.
    let member = member_repo::get_member_for_update(&mut *tx, order.league_member_id)
        .await?
        .ok_or_else(|| AppError::NotFound("League member not found".into()))?;

    let position =
        position_repo::get_position(&mut *tx, member.id, &order.market_id, order.outcome.as_str())
            .await?;

    let state = MemberState::from_parts(
        member.current_balance,
        member.total_pnl,
        member.total_trades as i64,
        0,
        0,
        position
            .iter()
            .map(|p| (p.market_id.clone(), order.outcome, p.shares, p.entry_price)),
    );

    let ledger_order = Order {
        market_id: order.market_id.clone(),
        outcome: order.outcome,
        kind: order.trade_type,
        shares: order.shares,
        price: clamp_price(order.price),
    };

    let applied = ledger::validate(&rules, &state, &ledger_order, category.as_deref())
        .and_then(|()| ledger::apply_trade(&rules, &state, &ledger_order))
        .map_err(|e| {
            counter!("trades_rejected_total").increment(1);
            tracing::info!(
                member_id = %member.id,
                market_id = %order.market_id,
                error = %e,
                "Trade rejected"
            );
            AppError::Trade(e)
        })?;

    // Persist the position delta.
    let days_to_resolution = match order.trade_type {
        TradeType::Buy => {
            match &position {
                Some(existing) => {
                    let holding = applied
                        .state
                        .holding(&order.market_id, order.outcome)
                        .ok_or_else(|| anyhow::anyhow!("buy left no holding"))?;
                    position_repo::update_holding(
                        &mut *tx,
                        existing.id,
                        holding.shares,
                        holding.entry_price,
                    )
                    .await?;
                }
                None => {
                    position_repo::insert_position(
                        &mut *tx,
                        member.id,
                        &order.market_id,
                        order.market_slug.as_deref(),
                        &order.market_question,
                        order.outcome.as_str(),
                        order.shares,
                        ledger_order.price,
                        market_end_date,
                    )
                    .await?;
                }
            }
            None
        }
        TradeType::Sell | TradeType::Settle => {
            let existing = position
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("sell applied without a position row"))?;
            if applied.position_closed {
                position_repo::delete_position(&mut *tx, existing.id).await?;
            } else {
                let holding = applied
                    .state
                    .holding(&order.market_id, order.outcome)
                    .ok_or_else(|| anyhow::anyhow!("partial sell left no holding"))?;
                position_repo::update_holding(
                    &mut *tx,
                    existing.id,
                    holding.shares,
                    holding.entry_price,
                )
                .await?;
            }
            position.as_ref().and_then(entry_days_to_resolution)
        }
    };

    let trade = trade_repo::insert_trade(
        &mut *tx,
        member.id,
        &order.market_id,
        order.market_slug.as_deref(),
        &order.market_question,
        order.trade_type.as_str(),
        order.outcome.as_str(),
        order.shares,
        ledger_order.price,
        applied.total_value,
        applied.realized_pnl,
        applied.realized_pnl.and(days_to_resolution),
    )
    .await?;

    // Win rate over the full sell log, including the trade just written.
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

    tx.commit().await.map_err(anyhow::Error::from)?;

    counter!("trades_executed_total").increment(1);
    histogram!("trade_apply_seconds").record(started.elapsed().as_secs_f64());

    tracing::info!(
        member_id = %member.id,
        market_id = %order.market_id,
        trade_type = %order.trade_type,
        shares = %order.shares,
        price = %ledger_order.price,
        pnl = ?applied.realized_pnl,
        "Trade executed"
    );

    Ok(ExecutedTrade {
        trade,
        new_balance: applied.state.balance,
        realized_pnl: applied.realized_pnl,
    })
}

/// Days between position entry and the market's end date, the input to
/// early-conviction scoring. None when the end date never arrived.
pub fn entry_days_to_resolution(position: &Position) -> Option<Decimal> {
    let end = position.market_end_date?;
    let opened = position.opened_at.unwrap_or_else(Utc::now);
    Some(days_between(opened, end))
}

fn days_between(from: DateTime<Utc>, to: DateTime<Utc>) -> Decimal {
    let seconds = (to - from).num_seconds().max(0);
    Decimal::from(seconds) / Decimal::from(86_400)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_days_between() {
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2026, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(days_between(from, to), Decimal::from(30));
        // Entry after the end date clamps to zero rather than going negative.
        assert_eq!(days_between(to, from), Decimal::ZERO);
    }
}
