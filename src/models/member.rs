use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row for the league_members table.
///
/// The aggregate columns (balance, pnl, win rate, trade count) are a
/// materialized cache of the ledger fold over this member's trade log;
/// `rank` is rewritten whenever league rankings are recomputed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LeagueMember {
    pub id: Uuid,
    pub league_id: Uuid,
    pub user_id: Uuid,
    pub current_balance: Decimal,
    pub total_pnl: Decimal,
    pub total_trades: i32,
    /// Percentage in [0, 100]; 0 until the first sell.
    pub win_rate: Decimal,
    pub rank: Option<i32>,
    pub joined_at: Option<DateTime<Utc>>,
}
