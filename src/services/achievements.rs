use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{achievement_repo, member_repo};

struct Rule {
    achievement_type: &'static str,
    title: &'static str,
    description: &'static str,
}

const FIRST_TRADE: Rule = Rule {
    achievement_type: "first_trade",
    title: "First Steps",
    description: "Made your first trade",
};
const BEST_ROI: Rule = Rule {
    achievement_type: "best_roi",
    title: "Top Performer",
    description: "Ranked #1 in the league",
};
const CONSISTENT_TRADER: Rule = Rule {
    achievement_type: "consistent_trader",
    title: "Consistent Trader",
    description: "Completed 10 trades",
};
const SHARPEST_PREDICTION: Rule = Rule {
    achievement_type: "sharpest_prediction",
    title: "Sharp Shooter",
    description: "Achieved 70%+ win rate",
};

/// Evaluate achievement rules over a user's memberships and award any
/// newly earned badges. Append-only and idempotent: existing badges are
/// never re-awarded or mutated.
pub async fn check_user(
    pool: &PgPool,
    user_id: Uuid,
    league_id: Option<Uuid>,
) -> anyhow::Result<Vec<String>> {
    let memberships = member_repo::get_memberships_by_user(pool, user_id, league_id).await?;
    let mut awarded = Vec::new();

    for membership in &memberships {
        let mut earned: Vec<&Rule> = Vec::new();

        if membership.total_trades >= 1 {
            earned.push(&FIRST_TRADE);
        }
        if membership.rank == Some(1) && membership.total_pnl > Decimal::ZERO {
            earned.push(&BEST_ROI);
        }
        if membership.total_trades >= 10 {
            earned.push(&CONSISTENT_TRADER);
        }
        if membership.win_rate >= Decimal::from(70) && membership.total_trades >= 10 {
            earned.push(&SHARPEST_PREDICTION);
        }

        for rule in earned {
            let already = achievement_repo::has_achievement(
                pool,
                user_id,
                membership.league_id,
                rule.achievement_type,
            )
            .await?;
            if already {
                continue;
            }

            if achievement_repo::award_achievement(
                pool,
                user_id,
                membership.league_id,
                rule.achievement_type,
                rule.title,
                rule.description,
            )
            .await?
            .is_some()
            {
                tracing::info!(
                    user_id = %user_id,
                    league_id = %membership.league_id,
                    achievement = rule.achievement_type,
                    "Achievement awarded"
                );
                awarded.push(rule.achievement_type.to_string());
            }
        }
    }

    Ok(awarded)
}
