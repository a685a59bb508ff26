use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the trades table. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    pub league_member_id: Uuid,
    pub market_id: String,
    pub market_slug: Option<String>,
    pub market_question: String,
    pub trade_type: String,
    pub outcome: String,
    pub shares: Decimal,
    pub price: Decimal,
    /// Cash moved: shares * price for buys, proceeds for sells/settles.
    pub total_value: Decimal,
    /// Realized P&L against weighted-average entry; sells and settles only.
    pub pnl: Option<Decimal>,
    /// Days between entry and market end date at the time the position was
    /// opened; feeds early-conviction scoring. Null when the end date was
    /// unknown upstream.
    pub days_to_resolution: Option<Decimal>,
    pub created_at: Option<DateTime<Utc>>,
}
