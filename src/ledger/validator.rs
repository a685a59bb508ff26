use rust_decimal::Decimal;

use super::engine::{LeagueRules, MemberState, Order};
use super::TradeError;
use crate::models::TradeType;

/// Pre-persistence trade validation. Pure: no I/O, no side effects, and
/// deterministic given the same snapshot, so failures are never retried.
///
/// `market_category` is the normalized category of the traded market; it is
/// only checked when the league defines a non-empty allow-list.
pub fn validate(
    rules: &LeagueRules,
    state: &MemberState,
    order: &Order,
    market_category: Option<&str>,
) -> Result<(), TradeError> {
    if order.shares <= Decimal::ZERO || order.price <= Decimal::ZERO {
        return Err(TradeError::InvalidAmount);
    }

    if !rules.allowed_categories.is_empty() {
        let category = market_category.unwrap_or("general");
        let allowed = rules
            .allowed_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category));
        if !allowed {
            return Err(TradeError::CategoryNotAllowed {
                category: category.to_string(),
            });
        }
    }

    if order.kind == TradeType::Buy {
        let cost = order.shares * order.price;

        if cost > state.balance {
            return Err(TradeError::InsufficientBalance {
                needed: cost,
                available: state.balance,
            });
        }

        let limit = state.balance * rules.max_position_size / Decimal::ONE_HUNDRED;
        if cost > limit {
            return Err(TradeError::PositionLimitExceeded {
                cost,
                limit,
                pct: rules.max_position_size,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Outcome;

    fn rules(categories: &[&str]) -> LeagueRules {
        LeagueRules {
            starting_capital: Decimal::from(10_000),
            max_position_size: Decimal::from(25),
            allowed_categories: categories.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn buy(shares: i64, price: Decimal) -> Order {
        Order {
            market_id: "mkt-1".into(),
            outcome: Outcome::Yes,
            kind: TradeType::Buy,
            shares: Decimal::from(shares),
            price,
        }
    }

    #[test]
    fn test_valid_buy_passes() {
        let rules = rules(&[]);
        let state = MemberState::new(rules.starting_capital);
        assert!(validate(&rules, &state, &buy(1000, Decimal::new(40, 2)), None).is_ok());
    }

    #[test]
    fn test_invalid_amount() {
        let rules = rules(&[]);
        let state = MemberState::new(rules.starting_capital);
        assert_eq!(
            validate(&rules, &state, &buy(0, Decimal::new(40, 2)), None),
            Err(TradeError::InvalidAmount)
        );
        assert_eq!(
            validate(&rules, &state, &buy(10, Decimal::ZERO), None),
            Err(TradeError::InvalidAmount)
        );
    }

    #[test]
    fn test_insufficient_balance() {
        let rules = rules(&[]);
        let mut state = MemberState::new(rules.starting_capital);
        state.balance = Decimal::from(100);
        let result = validate(&rules, &state, &buy(1000, Decimal::new(50, 2)), None);
        assert!(matches!(result, Err(TradeError::InsufficientBalance { .. })));
    }

    #[test]
    fn test_position_limit_uses_current_balance() {
        let rules = rules(&[]);
        let mut state = MemberState::new(rules.starting_capital);
        state.balance = Decimal::from(1000); // limit is now 250, not 2500
        let result = validate(&rules, &state, &buy(1000, Decimal::new(50, 2)), None);
        assert!(matches!(
            result,
            Err(TradeError::PositionLimitExceeded { .. })
        ));
    }

    #[test]
    fn test_category_allow_list() {
        let rules = rules(&["politics", "crypto"]);
        let state = MemberState::new(rules.starting_capital);
        let order = buy(100, Decimal::new(40, 2));

        assert!(validate(&rules, &state, &order, Some("crypto")).is_ok());
        assert!(validate(&rules, &state, &order, Some("Politics")).is_ok());
        assert_eq!(
            validate(&rules, &state, &order, Some("sports")),
            Err(TradeError::CategoryNotAllowed {
                category: "sports".into()
            })
        );
    }

    #[test]
    fn test_empty_allow_list_allows_everything() {
        let rules = rules(&[]);
        let state = MemberState::new(rules.starting_capital);
        let order = buy(100, Decimal::new(40, 2));
        assert!(validate(&rules, &state, &order, Some("anything")).is_ok());
        assert!(validate(&rules, &state, &order, None).is_ok());
    }
}
