use chrono::Utc;
use metrics::counter;
use sqlx::PgPool;
use tokio::time::{interval, Duration};
use uuid::Uuid;

use crate::db::{league_repo, member_repo, trade_repo};
use crate::ledger::scoring::{compute_rank, MemberSnapshot, ScoredTrade};

/// Recompute and persist ranks for one league from a point-in-time
/// snapshot. Safe to run concurrently with trade application; a stale
/// ranking is acceptable and the next run corrects it.
pub async fn update_league_rankings(pool: &PgPool, league_id: Uuid) -> anyhow::Result<usize> {
    let league = league_repo::get_league(pool, league_id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("league {league_id} not found"))?;

    let members = member_repo::get_members_by_league(pool, league_id).await?;

    let mut snapshots = Vec::with_capacity(members.len());
    for member in &members {
        let realized = trade_repo::get_realized_results(pool, member.id).await?;
        snapshots.push(MemberSnapshot {
            member_id: member.id,
            joined_at: member.joined_at.unwrap_or_else(Utc::now),
            total_pnl: member.total_pnl,
            realized: realized
                .into_iter()
                .map(|(pnl, days)| ScoredTrade {
                    pnl,
                    days_to_resolution: days,
                })
                .collect(),
        });
    }

    let ranked = compute_rank(league.scoring_variant(), &snapshots);
    for entry in &ranked {
        member_repo::set_rank(pool, entry.member_id, entry.rank).await?;
    }

    counter!("ranking_runs_total").increment(1);
    tracing::info!(
        league_id = %league_id,
        members = ranked.len(),
        scoring = %league.scoring_type,
        "League rankings updated"
    );

    Ok(ranked.len())
}

/// Recompute every active league. Per-league failures are non-fatal: the
/// stale rank is retained and the failure logged.
pub async fn update_all_rankings(pool: &PgPool) {
    let leagues = match league_repo::get_active_leagues(pool).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(error = %e, "Failed to list active leagues; rankings skipped");
            return;
        }
    };

    metrics::gauge!("active_leagues").set(leagues.len() as f64);

    for league in &leagues {
        if let Err(e) = update_league_rankings(pool, league.id).await {
            tracing::warn!(
                error = %e,
                league_id = %league.id,
                "Ranking update skipped; stale rank retained"
            );
        }
    }
}

/// Periodic rank recomputation across all active leagues.
pub async fn run_ranking_poller(pool: PgPool, interval_secs: u64) {
    let mut ticker = interval(Duration::from_secs(interval_secs));

    loop {
        ticker.tick().await;
        tracing::debug!("Ranking poller: recomputing league ranks");
        update_all_rankings(&pool).await;
    }
}
