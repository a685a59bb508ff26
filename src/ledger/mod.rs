pub mod engine;
pub mod scoring;
pub mod validator;

pub use engine::{apply_trade, replay, Applied, LeagueRules, MemberState, Order};
pub use scoring::{compute_rank, MemberSnapshot, RankedMember, ScoredTrade, ScoringVariant};
pub use validator::validate;

use rust_decimal::Decimal;
use thiserror::Error;

/// Deterministic trade rejections. Surfaced verbatim to the caller;
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TradeError {
    #[error("trade amount must be positive")]
    InvalidAmount,

    #[error("insufficient balance: cost {needed}, available {available}")]
    InsufficientBalance { needed: Decimal, available: Decimal },

    #[error("position limit exceeded: cost {cost} over limit {limit} ({pct}% of balance)")]
    PositionLimitExceeded {
        cost: Decimal,
        limit: Decimal,
        pct: Decimal,
    },

    #[error("insufficient shares: selling {requested}, holding {held}")]
    InsufficientShares { requested: Decimal, held: Decimal },

    #[error("category \"{category}\" is not allowed in this league")]
    CategoryNotAllowed { category: String },

    #[error("invalid invite code")]
    InvalidInviteCode,
}
