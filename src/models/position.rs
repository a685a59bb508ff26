use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the positions table.
///
/// One row per (member, market, outcome); buys merge into the row with a
/// weighted-average entry price, sells shrink it, and it is deleted once
/// shares reach zero or the market settles.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: Uuid,
    pub league_member_id: Uuid,
    pub market_id: String,
    pub market_slug: Option<String>,
    pub market_question: String,
    pub outcome: String,
    pub shares: Decimal,
    pub entry_price: Decimal,
    pub current_price: Option<Decimal>,
    pub unrealized_pnl: Option<Decimal>,
    pub market_end_date: Option<DateTime<Utc>>,
    pub opened_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
