use metrics::gauge;
use sqlx::PgPool;
use tokio::time::{interval, Duration};

use crate::db::position_repo;
use crate::models::Outcome;
use crate::polymarket::{normalize, GammaClient};

/// Refresh current_price and unrealized_pnl on every open position,
/// fetching each distinct market once. Markets that fail to fetch keep
/// their last known price until the next pass.
pub async fn update_all_positions(pool: &PgPool, gamma: &GammaClient) -> anyhow::Result<usize> {
    let market_ids = position_repo::get_open_market_ids(pool).await?;
    let mut updated = 0usize;

    for market_id in &market_ids {
        let market = match gamma.get_market(market_id).await {
            Ok(raw) => normalize::normalize(&raw),
            Err(e) => {
                tracing::warn!(error = %e, market_id, "Market fetch failed; keeping stale prices");
                continue;
            }
        };

        let positions = position_repo::get_positions_for_market(pool, market_id).await?;
        for position in &positions {
            let Some(outcome) = Outcome::from_api_str(&position.outcome) else {
                tracing::warn!(position_id = %position.id, outcome = %position.outcome, "Unknown outcome on position");
                continue;
            };

            let current = market.price_for(outcome);
            let unrealized = (current - position.entry_price) * position.shares;

            if let Err(e) =
                position_repo::update_market_price(pool, position.id, current, unrealized).await
            {
                tracing::error!(error = %e, position_id = %position.id, "Failed to update position price");
            } else {
                updated += 1;
            }
        }
    }

    if let Ok(open) = position_repo::count_open_positions(pool).await {
        gauge!("open_positions").set(open as f64);
    }

    Ok(updated)
}

/// Periodic mark-to-market pass over all open positions.
pub async fn run_price_poller(pool: PgPool, gamma: GammaClient, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;
        tracing::debug!("Price poller: refreshing open positions");

        match update_all_positions(&pool, &gamma).await {
            Ok(updated) => tracing::debug!(updated, "Position prices refreshed"),
            Err(e) => tracing::error!(error = %e, "Position price pass failed"),
        }
    }
}
