use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::types::GammaMarket;
use crate::models::Outcome;

/// Prices are clamped into this band so downstream share math never
/// divides by zero or produces degenerate share counts.
pub const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01
pub const MAX_PRICE: Decimal = Decimal::from_parts(99, 0, 0, false, 2); // 0.99

const DEFAULT_PRICE: Decimal = Decimal::from_parts(5, 0, 0, false, 1); // 0.5

/// Canonical market record consumed by the validator and ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    pub id: String,
    pub question: String,
    pub slug: String,
    pub outcomes: Vec<String>,
    pub yes_price: Decimal,
    pub no_price: Decimal,
    pub volume: Decimal,
    pub liquidity: Decimal,
    pub end_date: Option<DateTime<Utc>>,
    pub category: String,
    pub active: bool,
    pub clob_token_ids: Vec<String>,
}

impl Market {
    pub fn price_for(&self, outcome: Outcome) -> Decimal {
        match outcome {
            Outcome::Yes => self.yes_price,
            Outcome::No => self.no_price,
        }
    }
}

/// Normalize a raw Gamma market into the canonical shape.
///
/// Unparseable outcome prices fall back to 0.5/0.5 rather than erroring:
/// market listings stay usable even when one upstream record is malformed.
pub fn normalize(raw: &GammaMarket) -> Market {
    let (yes_price, no_price) = parse_outcome_prices(raw.outcome_prices.as_ref());

    let id = raw
        .id
        .clone()
        .or_else(|| raw.condition_id.clone())
        .unwrap_or_default();

    let question = raw
        .question
        .clone()
        .or_else(|| raw.title.clone())
        .unwrap_or_default();

    let slug = raw
        .slug
        .clone()
        .or_else(|| raw.events.first().and_then(|e| e.slug.clone()))
        .unwrap_or_default();

    let category = raw
        .category
        .clone()
        .filter(|c| !c.is_empty())
        .or_else(|| first_tag(raw.tags.as_ref()))
        .unwrap_or_else(|| "general".to_string());

    let end_date = raw
        .end_date
        .as_deref()
        .or(raw.end_date_iso.as_deref())
        .and_then(parse_timestamp);

    Market {
        id,
        question,
        slug,
        outcomes: parse_outcomes(raw.outcomes.as_ref()),
        yes_price,
        no_price,
        volume: lenient_decimal(raw.volume.as_ref()),
        liquidity: lenient_decimal(raw.liquidity.as_ref()),
        end_date,
        category,
        active: raw.active != Some(false) && raw.closed != Some(true),
        clob_token_ids: raw.parse_token_ids(),
    }
}

/// Winning outcome of a resolved market, if one has been declared.
pub fn winning_outcome(raw: &GammaMarket) -> Option<Outcome> {
    raw.tokens
        .iter()
        .find(|t| t.winner == Some(true))
        .and_then(|t| Outcome::from_api_str(&t.outcome))
}

pub fn clamp_price(price: Decimal) -> Decimal {
    price.clamp(MIN_PRICE, MAX_PRICE)
}

/// outcomePrices arrives as `"[\"0.97\",\"0.03\"]"` or as an array of
/// strings/numbers. Anything unparseable yields the 0.5/0.5 default.
fn parse_outcome_prices(value: Option<&serde_json::Value>) -> (Decimal, Decimal) {
    let prices = value.map(string_list).unwrap_or_default();

    let parse = |idx: usize| {
        prices
            .get(idx)
            .and_then(|s| Decimal::from_str(s).ok())
            .unwrap_or(DEFAULT_PRICE)
    };

    (clamp_price(parse(0)), clamp_price(parse(1)))
}

fn parse_outcomes(value: Option<&serde_json::Value>) -> Vec<String> {
    let outcomes = value.map(string_list).unwrap_or_default();
    if outcomes.is_empty() {
        vec!["Yes".to_string(), "No".to_string()]
    } else {
        outcomes
    }
}

/// Decode a field that is either a JSON-encoded string (`"[\"a\",\"b\"]"`)
/// or a plain array.
fn string_list(value: &serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::String(s) => serde_json::from_str::<Vec<String>>(s).unwrap_or_default(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(|item| match item {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn lenient_decimal(value: Option<&serde_json::Value>) -> Decimal {
    match value {
        Some(serde_json::Value::String(s)) => Decimal::from_str(s).unwrap_or_default(),
        Some(serde_json::Value::Number(n)) => {
            Decimal::from_str(&n.to_string()).unwrap_or_default()
        }
        _ => Decimal::ZERO,
    }
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn first_tag(tags: Option<&serde_json::Value>) -> Option<String> {
    let first = tags?.as_array()?.first()?;
    match first {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Object(obj) => obj
            .get("label")
            .or_else(|| obj.get("slug"))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_with_prices(prices: serde_json::Value) -> GammaMarket {
        GammaMarket {
            id: Some("0xabc".into()),
            question: Some("Will it happen?".into()),
            outcome_prices: Some(prices),
            ..Default::default()
        }
    }

    #[test]
    fn test_stringified_prices() {
        let market = normalize(&raw_with_prices(json!("[\"0.97\",\"0.03\"]")));
        assert_eq!(market.yes_price, Decimal::new(97, 2));
        assert_eq!(market.no_price, Decimal::new(3, 2));
    }

    #[test]
    fn test_extreme_prices_clamped() {
        let market = normalize(&raw_with_prices(json!("[\"0.001\",\"0.999\"]")));
        assert_eq!(market.yes_price, Decimal::new(1, 2));
        assert_eq!(market.no_price, Decimal::new(99, 2));
    }

    #[test]
    fn test_array_prices() {
        let market = normalize(&raw_with_prices(json!(["0.62", "0.38"])));
        assert_eq!(market.yes_price, Decimal::new(62, 2));
        assert_eq!(market.no_price, Decimal::new(38, 2));
    }

    #[test]
    fn test_garbage_prices_default() {
        let market = normalize(&raw_with_prices(json!("not json")));
        assert_eq!(market.yes_price, Decimal::new(5, 1));
        assert_eq!(market.no_price, Decimal::new(5, 1));

        let market = normalize(&GammaMarket::default());
        assert_eq!(market.yes_price, Decimal::new(5, 1));
    }

    #[test]
    fn test_category_fallbacks() {
        let market = normalize(&GammaMarket {
            category: Some("crypto".into()),
            ..Default::default()
        });
        assert_eq!(market.category, "crypto");

        let market = normalize(&GammaMarket {
            tags: Some(json!(["sports", "nba"])),
            ..Default::default()
        });
        assert_eq!(market.category, "sports");

        let market = normalize(&GammaMarket {
            tags: Some(json!([{ "label": "Politics" }])),
            ..Default::default()
        });
        assert_eq!(market.category, "Politics");

        let market = normalize(&GammaMarket::default());
        assert_eq!(market.category, "general");
    }

    #[test]
    fn test_active_flag() {
        assert!(normalize(&GammaMarket::default()).active);
        assert!(
            !normalize(&GammaMarket {
                closed: Some(true),
                ..Default::default()
            })
            .active
        );
        assert!(
            !normalize(&GammaMarket {
                active: Some(false),
                ..Default::default()
            })
            .active
        );
    }

    #[test]
    fn test_winning_outcome() {
        use super::super::types::GammaToken;

        let raw = GammaMarket {
            tokens: vec![
                GammaToken {
                    outcome: "Yes".into(),
                    winner: Some(false),
                },
                GammaToken {
                    outcome: "No".into(),
                    winner: Some(true),
                },
            ],
            ..Default::default()
        };
        assert_eq!(winning_outcome(&raw), Some(Outcome::No));
        assert_eq!(winning_outcome(&GammaMarket::default()), None);
    }

    #[test]
    fn test_lenient_numeric_fields() {
        let market = normalize(&GammaMarket {
            volume: Some(json!("12345.5")),
            liquidity: Some(json!(678)),
            ..Default::default()
        });
        assert_eq!(market.volume, Decimal::new(123455, 1));
        assert_eq!(market.liquidity, Decimal::from(678));
    }
}
