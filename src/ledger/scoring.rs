use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How much extra weight an early entry earns under early-conviction
/// scoring. The curve and its parameter are league configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ConvictionCurve {
    /// weight = e^(rate_per_day * days_to_resolution)
    Exponential { rate_per_day: Decimal },
    /// weight = 1 + min(days, horizon) / horizon, capped at 2x.
    Linear { horizon_days: Decimal },
}

impl ConvictionCurve {
    pub fn exponential(rate_per_day: Decimal) -> Self {
        ConvictionCurve::Exponential { rate_per_day }
    }

    pub fn linear(horizon_days: Decimal) -> Self {
        ConvictionCurve::Linear { horizon_days }
    }

    /// Weight for a trade entered `days_to_resolution` days before the
    /// market resolves. Monotonically non-decreasing in days; 1.0 at zero.
    pub fn weight(&self, days_to_resolution: Decimal) -> Decimal {
        let days = days_to_resolution.max(Decimal::ZERO);
        match self {
            ConvictionCurve::Exponential { rate_per_day } => (*rate_per_day * days).exp(),
            ConvictionCurve::Linear { horizon_days } => {
                if *horizon_days <= Decimal::ZERO {
                    return Decimal::ONE;
                }
                Decimal::ONE + days.min(*horizon_days) / *horizon_days
            }
        }
    }
}

/// Closed set of ranking strategies, selected by league configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringVariant {
    Standard,
    EarlyConviction(ConvictionCurve),
    RiskAdjusted,
}

/// One realized trade as seen by the scorer.
#[derive(Debug, Clone)]
pub struct ScoredTrade {
    pub pnl: Decimal,
    /// Days between entry and market end date, captured at entry.
    /// None when the end date was unknown; weighted as 1.0.
    pub days_to_resolution: Option<Decimal>,
}

/// Point-in-time snapshot of one member for ranking.
#[derive(Debug, Clone)]
pub struct MemberSnapshot {
    pub member_id: Uuid,
    pub joined_at: DateTime<Utc>,
    pub total_pnl: Decimal,
    pub realized: Vec<ScoredTrade>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedMember {
    pub member_id: Uuid,
    pub rank: i32,
    pub score: Decimal,
}

/// Assign 1-based ranks to a league snapshot. Recomputed on demand and
/// idempotent: the same snapshot always produces the same ordering
/// (ties broken by earlier joined_at, then member id).
pub fn compute_rank(variant: ScoringVariant, members: &[MemberSnapshot]) -> Vec<RankedMember> {
    let mut scored: Vec<(&MemberSnapshot, Decimal, bool)> = members
        .iter()
        .map(|m| {
            let (score, ranks_last) = match variant {
                ScoringVariant::Standard => (m.total_pnl, false),
                ScoringVariant::EarlyConviction(curve) => (conviction_score(m, &curve), false),
                ScoringVariant::RiskAdjusted => {
                    if m.realized.len() < 2 {
                        // Too few realized trades for a meaningful ratio;
                        // these members sort behind everyone, by raw pnl.
                        (m.total_pnl, true)
                    } else {
                        (sharpe_ratio(&returns(m)), false)
                    }
                }
            };
            (m, score, ranks_last)
        })
        .collect();

    scored.sort_by(|(a, sa, la), (b, sb, lb)| {
        la.cmp(lb)
            .then_with(|| sb.cmp(sa))
            .then_with(|| a.joined_at.cmp(&b.joined_at))
            .then_with(|| a.member_id.cmp(&b.member_id))
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (m, score, _))| RankedMember {
            member_id: m.member_id,
            rank: i as i32 + 1,
            score,
        })
        .collect()
}

fn returns(m: &MemberSnapshot) -> Vec<Decimal> {
    m.realized.iter().map(|t| t.pnl).collect()
}

fn conviction_score(m: &MemberSnapshot, curve: &ConvictionCurve) -> Decimal {
    m.realized
        .iter()
        .map(|t| {
            let weight = t
                .days_to_resolution
                .map(|d| curve.weight(d))
                .unwrap_or(Decimal::ONE);
            t.pnl * weight
        })
        .sum()
}

/// Risk-adjusted return: mean(returns) / stddev(returns).
/// Returns Decimal::ZERO if insufficient data.
pub fn sharpe_ratio(returns: &[Decimal]) -> Decimal {
    if returns.len() < 2 {
        return Decimal::ZERO;
    }

    let n = Decimal::from(returns.len() as i64);
    let mean = returns.iter().copied().sum::<Decimal>() / n;

    let variance = returns
        .iter()
        .map(|r| {
            let diff = *r - mean;
            diff * diff
        })
        .sum::<Decimal>()
        / n;

    let std_dev = variance.sqrt().unwrap_or(Decimal::ONE);

    if std_dev.is_zero() {
        return Decimal::ZERO;
    }

    mean / std_dev
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn member(id: u128, joined_days_ago: i64, pnl: i64, realized: &[i64]) -> MemberSnapshot {
        MemberSnapshot {
            member_id: Uuid::from_u128(id),
            joined_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
                - chrono::Duration::days(joined_days_ago),
            total_pnl: Decimal::from(pnl),
            realized: realized
                .iter()
                .map(|&p| ScoredTrade {
                    pnl: Decimal::from(p),
                    days_to_resolution: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_standard_orders_by_pnl() {
        let members = vec![
            member(1, 0, 100, &[]),
            member(2, 0, 500, &[]),
            member(3, 0, -50, &[]),
        ];
        let ranked = compute_rank(ScoringVariant::Standard, &members);
        assert_eq!(ranked[0].member_id, Uuid::from_u128(2));
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[1].member_id, Uuid::from_u128(1));
        assert_eq!(ranked[2].member_id, Uuid::from_u128(3));
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn test_standard_tie_broken_by_join_time() {
        // Same pnl; the earlier joiner ranks higher.
        let members = vec![member(1, 3, 100, &[]), member(2, 10, 100, &[])];
        let ranked = compute_rank(ScoringVariant::Standard, &members);
        assert_eq!(ranked[0].member_id, Uuid::from_u128(2));
    }

    #[test]
    fn test_rank_idempotent() {
        let members = vec![
            member(1, 0, 100, &[50, 50]),
            member(2, 1, 100, &[40, 60]),
            member(3, 2, -20, &[-20]),
        ];
        let first = compute_rank(ScoringVariant::RiskAdjusted, &members);
        let second = compute_rank(ScoringVariant::RiskAdjusted, &members);
        assert_eq!(first, second);
    }

    #[test]
    fn test_risk_adjusted_few_trades_rank_last() {
        let members = vec![
            // Huge raw pnl but a single realized trade.
            member(1, 0, 9000, &[9000]),
            // Modest but consistent.
            member(2, 0, 30, &[10, 10, 10]),
            member(3, 0, 50, &[]),
        ];
        let ranked = compute_rank(ScoringVariant::RiskAdjusted, &members);
        assert_eq!(ranked[0].member_id, Uuid::from_u128(2));
        // Under-traded members ordered by raw pnl among themselves.
        assert_eq!(ranked[1].member_id, Uuid::from_u128(1));
        assert_eq!(ranked[2].member_id, Uuid::from_u128(3));
    }

    #[test]
    fn test_sharpe_zero_variance() {
        // Identical returns carry no risk signal; the ratio is undefined
        // and reported as zero rather than inflated.
        let flat = vec![Decimal::from(10), Decimal::from(10)];
        assert_eq!(sharpe_ratio(&flat), Decimal::ZERO);
    }

    #[test]
    fn test_early_conviction_rewards_early_entries() {
        let curve = ConvictionCurve::linear(Decimal::from(30));

        let mut early = member(1, 0, 100, &[]);
        early.realized = vec![ScoredTrade {
            pnl: Decimal::from(100),
            days_to_resolution: Some(Decimal::from(30)),
        }];

        let mut late = member(2, 0, 100, &[]);
        late.realized = vec![ScoredTrade {
            pnl: Decimal::from(100),
            days_to_resolution: Some(Decimal::ZERO),
        }];

        let ranked = compute_rank(ScoringVariant::EarlyConviction(curve), &[early, late]);
        assert_eq!(ranked[0].member_id, Uuid::from_u128(1));
        assert_eq!(ranked[0].score, Decimal::from(200));
        assert_eq!(ranked[1].score, Decimal::from(100));
    }

    #[test]
    fn test_conviction_curve_monotone() {
        let exp = ConvictionCurve::exponential(Decimal::new(5, 2));
        assert_eq!(exp.weight(Decimal::ZERO), Decimal::ONE);
        assert!(exp.weight(Decimal::from(10)) > exp.weight(Decimal::from(1)));

        let lin = ConvictionCurve::linear(Decimal::from(30));
        assert_eq!(lin.weight(Decimal::from(30)), Decimal::from(2));
        // Capped past the horizon.
        assert_eq!(lin.weight(Decimal::from(90)), Decimal::from(2));
    }
}
