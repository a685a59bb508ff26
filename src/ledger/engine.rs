use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::TradeError;
use crate::models::{Outcome, TradeType};

/// Positions smaller than this are treated as fully closed.
const SHARE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9); // 1e-9

/// The league configuration the ledger needs. Extracted from a League row
/// so the fold stays free of database types.
#[derive(Debug, Clone)]
pub struct LeagueRules {
    pub starting_capital: Decimal,
    /// Percent of current balance, in (0, 100].
    pub max_position_size: Decimal,
    /// Empty means no category restriction.
    pub allowed_categories: Vec<String>,
}

/// A trade order as handed to the ledger: already normalized, price already
/// clamped to [0.01, 0.99] by the market adapter (settles pay 0 or 1).
#[derive(Debug, Clone)]
pub struct Order {
    pub market_id: String,
    pub outcome: Outcome,
    pub kind: TradeType,
    pub shares: Decimal,
    pub price: Decimal,
}

/// An open holding in one outcome of one market.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Holding {
    pub shares: Decimal,
    pub entry_price: Decimal,
}

/// The financial truth of a membership: the result of folding the trade
/// log from the league's starting capital. The league_members row is a
/// materialized cache of this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberState {
    pub balance: Decimal,
    pub positions: BTreeMap<(String, Outcome), Holding>,
    pub total_pnl: Decimal,
    pub total_trades: i64,
    pub sells: i64,
    pub profitable_sells: i64,
}

impl MemberState {
    pub fn new(starting_capital: Decimal) -> Self {
        Self {
            balance: starting_capital,
            positions: BTreeMap::new(),
            total_pnl: Decimal::ZERO,
            total_trades: 0,
            sells: 0,
            profitable_sells: 0,
        }
    }

    /// Rebuild a state from persisted rows (member aggregates + open
    /// positions) instead of replaying the full log.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        balance: Decimal,
        total_pnl: Decimal,
        total_trades: i64,
        sells: i64,
        profitable_sells: i64,
        positions: impl IntoIterator<Item = (String, Outcome, Decimal, Decimal)>,
    ) -> Self {
        let positions = positions
            .into_iter()
            .map(|(market_id, outcome, shares, entry_price)| {
                ((market_id, outcome), Holding { shares, entry_price })
            })
            .collect();

        Self {
            balance,
            positions,
            total_pnl,
            total_trades,
            sells,
            profitable_sells,
        }
    }

    /// Profitable sells over total sells, as a percentage. Zero until the
    /// first sell.
    pub fn win_rate(&self) -> Decimal {
        if self.sells == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.profitable_sells) / Decimal::from(self.sells) * Decimal::ONE_HUNDRED
    }

    pub fn holding(&self, market_id: &str, outcome: Outcome) -> Option<&Holding> {
        self.positions.get(&(market_id.to_string(), outcome))
    }
}

/// Result of applying one order.
#[derive(Debug, Clone)]
pub struct Applied {
    pub state: MemberState,
    /// Present for sells and settles.
    pub realized_pnl: Option<Decimal>,
    /// Cash moved: cost for buys, proceeds otherwise.
    pub total_value: Decimal,
    /// True when the order removed the position entirely.
    pub position_closed: bool,
}

/// Apply a single order to a member state. Pure: the input state is never
/// mutated, so a rejected trade leaves the caller's snapshot intact.
pub fn apply_trade(
    rules: &LeagueRules,
    state: &MemberState,
    order: &Order,
) -> Result<Applied, TradeError> {
    if order.shares <= Decimal::ZERO || order.price < Decimal::ZERO {
        return Err(TradeError::InvalidAmount);
    }

    match order.kind {
        TradeType::Buy => apply_buy(rules, state, order),
        TradeType::Sell | TradeType::Settle => apply_sell(state, order),
    }
}

fn apply_buy(
    rules: &LeagueRules,
    state: &MemberState,
    order: &Order,
) -> Result<Applied, TradeError> {
    if order.price <= Decimal::ZERO {
        return Err(TradeError::InvalidAmount);
    }

    let cost = order.shares * order.price;

    if cost > state.balance {
        return Err(TradeError::InsufficientBalance {
            needed: cost,
            available: state.balance,
        });
    }

    // Limit is against the balance at execution time, not starting capital.
    let limit = state.balance * rules.max_position_size / Decimal::ONE_HUNDRED;
    if cost > limit {
        return Err(TradeError::PositionLimitExceeded {
            cost,
            limit,
            pct: rules.max_position_size,
        });
    }

    let mut next = state.clone();
    next.balance -= cost;
    next.total_trades += 1;

    let key = (order.market_id.clone(), order.outcome);
    match next.positions.get_mut(&key) {
        Some(holding) => {
            // Weighted-average cost basis across buys.
            let merged = holding.shares + order.shares;
            holding.entry_price =
                (holding.entry_price * holding.shares + order.price * order.shares) / merged;
            holding.shares = merged;
        }
        None => {
            next.positions.insert(
                key,
                Holding {
                    shares: order.shares,
                    entry_price: order.price,
                },
            );
        }
    }

    Ok(Applied {
        state: next,
        realized_pnl: None,
        total_value: cost,
        position_closed: false,
    })
}

fn apply_sell(state: &MemberState, order: &Order) -> Result<Applied, TradeError> {
    let key = (order.market_id.clone(), order.outcome);

    let held = state
        .positions
        .get(&key)
        .map(|h| h.shares)
        .unwrap_or(Decimal::ZERO);

    if order.shares > held + SHARE_EPSILON {
        return Err(TradeError::InsufficientShares {
            requested: order.shares,
            held,
        });
    }

    let mut next = state.clone();
    let holding = next
        .positions
        .get_mut(&key)
        .ok_or(TradeError::InsufficientShares {
            requested: order.shares,
            held: Decimal::ZERO,
        })?;

    let proceeds = order.shares * order.price;
    let realized = order.shares * (order.price - holding.entry_price);

    holding.shares -= order.shares;
    let position_closed = holding.shares <= SHARE_EPSILON;
    if position_closed {
        next.positions.remove(&key);
    }

    next.balance += proceeds;
    next.total_pnl += realized;
    next.total_trades += 1;
    next.sells += 1;
    if realized > Decimal::ZERO {
        next.profitable_sells += 1;
    }

    Ok(Applied {
        state: next,
        realized_pnl: Some(realized),
        total_value: proceeds,
        position_closed,
    })
}

/// Fold an ordered trade log from the league's starting capital.
/// Idempotent: the same log always yields the same state.
pub fn replay(rules: &LeagueRules, orders: &[Order]) -> Result<MemberState, TradeError> {
    let mut state = MemberState::new(rules.starting_capital);
    for order in orders {
        state = apply_trade(rules, &state, order)?.state;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> LeagueRules {
        LeagueRules {
            starting_capital: Decimal::from(10_000),
            max_position_size: Decimal::from(25),
            allowed_categories: vec![],
        }
    }

    fn order(kind: TradeType, shares: i64, price: Decimal) -> Order {
        Order {
            market_id: "mkt-1".into(),
            outcome: Outcome::Yes,
            kind,
            shares: Decimal::from(shares),
            price,
        }
    }

    #[test]
    fn test_buy_sell_scenario() {
        // League: capital 10000, max position 25%.
        let rules = rules();
        let state = MemberState::new(rules.starting_capital);

        // Buy 6250 shares @ 0.40 = 2500, exactly at the 25% limit.
        let applied = apply_trade(&rules, &state, &order(TradeType::Buy, 6250, Decimal::new(40, 2)))
            .expect("buy should pass");
        let state = applied.state;
        assert_eq!(state.balance, Decimal::from(7500));
        let holding = state.holding("mkt-1", Outcome::Yes).unwrap();
        assert_eq!(holding.shares, Decimal::from(6250));
        assert_eq!(holding.entry_price, Decimal::new(40, 2));

        // A further 3000 buy exceeds 25% of the 7500 balance (1875).
        let rejected = apply_trade(
            &rules,
            &state,
            &order(TradeType::Buy, 6000, Decimal::new(50, 2)),
        );
        assert!(matches!(
            rejected,
            Err(TradeError::PositionLimitExceeded { .. })
        ));

        // Sell 500 @ 0.50: pnl = 500 * 0.10 = 50, proceeds 250.
        let applied = apply_trade(&rules, &state, &order(TradeType::Sell, 500, Decimal::new(50, 2)))
            .expect("sell should pass");
        assert_eq!(applied.realized_pnl, Some(Decimal::from(50)));
        let state = applied.state;
        assert_eq!(state.balance, Decimal::from(7750));
        assert_eq!(state.total_pnl, Decimal::from(50));
        let holding = state.holding("mkt-1", Outcome::Yes).unwrap();
        assert_eq!(holding.shares, Decimal::from(5750));
        assert_eq!(holding.entry_price, Decimal::new(40, 2));
    }

    #[test]
    fn test_weighted_average_entry() {
        let rules = rules();
        let state = MemberState::new(rules.starting_capital);

        let state = apply_trade(&rules, &state, &order(TradeType::Buy, 1000, Decimal::new(40, 2)))
            .unwrap()
            .state;
        let state = apply_trade(&rules, &state, &order(TradeType::Buy, 500, Decimal::new(70, 2)))
            .unwrap()
            .state;

        // (1000*0.40 + 500*0.70) / 1500 = 0.50
        let holding = state.holding("mkt-1", Outcome::Yes).unwrap();
        assert_eq!(holding.shares, Decimal::from(1500));
        assert_eq!(holding.entry_price, Decimal::new(50, 2));
    }

    #[test]
    fn test_insufficient_balance() {
        let rules = LeagueRules {
            starting_capital: Decimal::from(100),
            max_position_size: Decimal::ONE_HUNDRED,
            allowed_categories: vec![],
        };
        let state = MemberState::new(rules.starting_capital);

        let rejected = apply_trade(
            &rules,
            &state,
            &order(TradeType::Buy, 1000, Decimal::new(50, 2)),
        );
        assert!(matches!(
            rejected,
            Err(TradeError::InsufficientBalance { .. })
        ));
    }

    #[test]
    fn test_oversell_rejected_and_state_unchanged() {
        let rules = rules();
        let state = apply_trade(
            &rules,
            &MemberState::new(rules.starting_capital),
            &order(TradeType::Buy, 100, Decimal::new(40, 2)),
        )
        .unwrap()
        .state;

        let before = state.clone();
        let rejected = apply_trade(&rules, &state, &order(TradeType::Sell, 200, Decimal::new(50, 2)));
        assert!(matches!(rejected, Err(TradeError::InsufficientShares { .. })));
        assert_eq!(state, before);
    }

    #[test]
    fn test_sell_unowned_market() {
        let rules = rules();
        let state = MemberState::new(rules.starting_capital);
        let rejected = apply_trade(&rules, &state, &order(TradeType::Sell, 1, Decimal::new(50, 2)));
        assert!(matches!(rejected, Err(TradeError::InsufficientShares { .. })));
    }

    #[test]
    fn test_full_sell_removes_position() {
        let rules = rules();
        let state = apply_trade(
            &rules,
            &MemberState::new(rules.starting_capital),
            &order(TradeType::Buy, 100, Decimal::new(40, 2)),
        )
        .unwrap()
        .state;

        let applied =
            apply_trade(&rules, &state, &order(TradeType::Sell, 100, Decimal::new(30, 2))).unwrap();
        assert!(applied.position_closed);
        assert!(applied.state.positions.is_empty());
        // Losing sell counts toward sells but not profitable ones.
        assert_eq!(applied.state.sells, 1);
        assert_eq!(applied.state.profitable_sells, 0);
    }

    #[test]
    fn test_settle_pays_out_winner() {
        let rules = rules();
        let state = apply_trade(
            &rules,
            &MemberState::new(rules.starting_capital),
            &order(TradeType::Buy, 100, Decimal::new(40, 2)),
        )
        .unwrap()
        .state;

        let applied =
            apply_trade(&rules, &state, &order(TradeType::Settle, 100, Decimal::ONE)).unwrap();
        // Payout 100, pnl = 100 * (1 - 0.40) = 60.
        assert_eq!(applied.total_value, Decimal::from(100));
        assert_eq!(applied.realized_pnl, Some(Decimal::from(60)));
        assert!(applied.position_closed);
    }

    #[test]
    fn test_settle_loser_at_zero() {
        let rules = rules();
        let state = apply_trade(
            &rules,
            &MemberState::new(rules.starting_capital),
            &order(TradeType::Buy, 100, Decimal::new(40, 2)),
        )
        .unwrap()
        .state;

        let applied =
            apply_trade(&rules, &state, &order(TradeType::Settle, 100, Decimal::ZERO)).unwrap();
        assert_eq!(applied.total_value, Decimal::ZERO);
        assert_eq!(applied.realized_pnl, Some(Decimal::from(-40)));
    }

    #[test]
    fn test_balance_conservation() {
        // balance = capital - sum(buys) + sum(proceeds), exactly.
        let rules = rules();
        let log = vec![
            order(TradeType::Buy, 1000, Decimal::new(40, 2)),
            order(TradeType::Buy, 500, Decimal::new(30, 2)),
            order(TradeType::Sell, 700, Decimal::new(45, 2)),
            order(TradeType::Sell, 800, Decimal::new(35, 2)),
        ];
        let state = replay(&rules, &log).unwrap();

        let spent = Decimal::from(1000) * Decimal::new(40, 2)
            + Decimal::from(500) * Decimal::new(30, 2);
        let proceeds = Decimal::from(700) * Decimal::new(45, 2)
            + Decimal::from(800) * Decimal::new(35, 2);
        assert_eq!(state.balance, rules.starting_capital - spent + proceeds);
        assert!(state.positions.is_empty());
    }

    #[test]
    fn test_win_rate_bounds() {
        let state = MemberState::new(Decimal::from(1000));
        assert_eq!(state.win_rate(), Decimal::ZERO);

        let rules = rules();
        let log = vec![
            order(TradeType::Buy, 200, Decimal::new(40, 2)),
            order(TradeType::Sell, 100, Decimal::new(50, 2)),
            order(TradeType::Sell, 100, Decimal::new(20, 2)),
        ];
        let state = replay(&rules, &log).unwrap();
        assert_eq!(state.win_rate(), Decimal::from(50));
        assert!(state.win_rate() >= Decimal::ZERO && state.win_rate() <= Decimal::ONE_HUNDRED);
    }

    #[test]
    fn test_replay_idempotent() {
        let rules = rules();
        let log = vec![
            order(TradeType::Buy, 500, Decimal::new(40, 2)),
            order(TradeType::Sell, 250, Decimal::new(60, 2)),
        ];
        assert_eq!(replay(&rules, &log).unwrap(), replay(&rules, &log).unwrap());
    }

    #[test]
    fn test_zero_or_negative_amount() {
        let rules = rules();
        let state = MemberState::new(rules.starting_capital);
        let rejected = apply_trade(&rules, &state, &order(TradeType::Buy, 0, Decimal::new(50, 2)));
        assert_eq!(rejected.unwrap_err(), TradeError::InvalidAmount);
    }
}
