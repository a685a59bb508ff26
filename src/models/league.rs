use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::ledger::scoring::{ConvictionCurve, ScoringVariant};

/// Database row for the leagues table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct League {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub commissioner_id: Uuid,
    pub is_public: bool,
    /// Present only for private leagues.
    pub invite_code: Option<String>,
    pub starting_capital: Decimal,
    /// Max single-position cost as percent of current balance, in (0, 100].
    pub max_position_size: Decimal,
    /// "standard" | "early_conviction" | "risk_adjusted".
    pub scoring_type: String,
    /// Decay curve for early_conviction scoring: "exponential" | "linear".
    pub conviction_curve: Option<String>,
    /// Curve parameter: rate per day (exponential) or horizon in days (linear).
    pub conviction_rate: Option<Decimal>,
    /// Empty array means every category is allowed.
    pub allowed_categories: Vec<String>,
    pub status: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Scoring variant names as stored in the scoring_type column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringType {
    Standard,
    EarlyConviction,
    RiskAdjusted,
}

impl ScoringType {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "standard" => Some(ScoringType::Standard),
            "early_conviction" => Some(ScoringType::EarlyConviction),
            "risk_adjusted" => Some(ScoringType::RiskAdjusted),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringType::Standard => "standard",
            ScoringType::EarlyConviction => "early_conviction",
            ScoringType::RiskAdjusted => "risk_adjusted",
        }
    }
}

impl League {
    /// Resolve the stored scoring columns into a concrete variant.
    /// Unknown or missing configuration falls back to standard scoring.
    pub fn scoring_variant(&self) -> ScoringVariant {
        match ScoringType::from_api_str(&self.scoring_type) {
            Some(ScoringType::EarlyConviction) => {
                ScoringVariant::EarlyConviction(self.conviction_curve())
            }
            Some(ScoringType::RiskAdjusted) => ScoringVariant::RiskAdjusted,
            _ => ScoringVariant::Standard,
        }
    }

    fn conviction_curve(&self) -> ConvictionCurve {
        let rate = self.conviction_rate.unwrap_or_default();
        match self.conviction_curve.as_deref() {
            Some("linear") => ConvictionCurve::linear(rate),
            _ => ConvictionCurve::exponential(rate),
        }
    }
}
