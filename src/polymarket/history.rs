use chrono::Utc;
use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;

use super::clob_client::ClobClient;
use super::gamma_client::GammaClient;
use super::normalize::{self, clamp_price};

/// Chart window requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    Day,
    Week,
    Month,
    All,
}

impl Interval {
    pub fn from_api_str(s: &str) -> Option<Self> {
        match s {
            "1d" => Some(Interval::Day),
            "1w" => Some(Interval::Week),
            "1m" => Some(Interval::Month),
            "all" => Some(Interval::All),
            _ => None,
        }
    }

    /// Number of samples shown for this window.
    pub fn points(&self) -> usize {
        match self {
            Interval::Day => 24,
            Interval::Week => 7 * 24,
            Interval::Month => 30,
            Interval::All => 90,
        }
    }

    /// Upstream sample spacing in minutes.
    pub fn fidelity(&self) -> u32 {
        match self {
            Interval::Day => 60,
            Interval::Week => 360,
            _ => 1440,
        }
    }

    fn step_ms(&self) -> i64 {
        match self {
            Interval::Day | Interval::Week => 3_600_000,
            _ => 86_400_000,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PricePoint {
    pub timestamp_ms: i64,
    pub price: Decimal,
}

/// Where a series came from. Synthetic data keeps charts rendering when
/// the upstream feed fails, but is always tagged so callers and tests can
/// tell it from real history.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesSource {
    Clob,
    Synthetic { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    pub points: Vec<PricePoint>,
    pub source: SeriesSource,
}

impl PriceSeries {
    pub fn is_synthetic(&self) -> bool {
        matches!(self.source, SeriesSource::Synthetic { .. })
    }
}

/// Fetch the YES-token price history for a market. Never fails: every
/// upstream problem degrades to a tagged synthetic series so market pages
/// stay usable. Trade execution must not consume this.
pub async fn fetch_price_history(
    gamma: &GammaClient,
    clob: &ClobClient,
    market_id: &str,
    interval: Interval,
) -> PriceSeries {
    let market = match gamma.get_market(market_id).await {
        Ok(raw) => normalize::normalize(&raw),
        Err(e) => {
            tracing::warn!(error = %e, market_id, "Market fetch failed; serving synthetic history");
            return synthetic_series(interval, Decimal::new(5, 1), format!("market fetch failed: {e}"));
        }
    };

    let Some(token_id) = market.clob_token_ids.first() else {
        return synthetic_series(
            interval,
            market.yes_price,
            "market has no clob token ids".to_string(),
        );
    };

    match clob.get_price_history(token_id, interval.fidelity()).await {
        Ok(history) if !history.is_empty() => {
            let start = history.len().saturating_sub(interval.points());
            let points = history[start..]
                .iter()
                .map(|raw| PricePoint {
                    timestamp_ms: raw.t * 1000,
                    price: clamp_price(Decimal::from_f64(raw.p).unwrap_or(Decimal::new(5, 1))),
                })
                .collect();
            PriceSeries {
                points,
                source: SeriesSource::Clob,
            }
        }
        Ok(_) => synthetic_series(
            interval,
            market.yes_price,
            "empty price history".to_string(),
        ),
        Err(e) => {
            tracing::warn!(error = %e, market_id, "Price history fetch failed; serving synthetic history");
            synthetic_series(interval, market.yes_price, format!("clob fetch failed: {e}"))
        }
    }
}

/// Random walk drifting toward the current price, ending exactly on it.
pub fn synthetic_series(interval: Interval, current_price: Decimal, reason: String) -> PriceSeries {
    let mut rng = rand::thread_rng();
    let target: f64 = current_price.to_f64().unwrap_or(0.5);

    let count = interval.points();
    let step_ms = interval.step_ms();
    let now_ms = Utc::now().timestamp_millis();

    let mut price = (target - 0.1 + rng.gen::<f64>() * 0.2).clamp(0.01, 0.99);
    let mut points = Vec::with_capacity(count + 1);

    for i in (0..=count).rev() {
        let drift = (target - price) * 0.1;
        price = (price + drift + (rng.gen::<f64>() - 0.5) * 0.05).clamp(0.01, 0.99);

        points.push(PricePoint {
            timestamp_ms: now_ms - i as i64 * step_ms,
            price: clamp_price(
                Decimal::from_f64(price)
                    .unwrap_or(Decimal::new(5, 1))
                    .round_dp(3),
            ),
        });
    }

    if let Some(last) = points.last_mut() {
        last.price = clamp_price(current_price);
    }

    PriceSeries {
        points,
        source: SeriesSource::Synthetic { reason },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_parsing() {
        assert_eq!(Interval::from_api_str("1d"), Some(Interval::Day));
        assert_eq!(Interval::from_api_str("1w"), Some(Interval::Week));
        assert_eq!(Interval::from_api_str("1m"), Some(Interval::Month));
        assert_eq!(Interval::from_api_str("all"), Some(Interval::All));
        assert_eq!(Interval::from_api_str("1y"), None);
    }

    #[test]
    fn test_synthetic_series_is_tagged_and_bounded() {
        let series = synthetic_series(Interval::Month, Decimal::new(62, 2), "test".into());
        assert!(series.is_synthetic());
        assert_eq!(series.points.len(), Interval::Month.points() + 1);

        for point in &series.points {
            assert!(point.price >= Decimal::new(1, 2));
            assert!(point.price <= Decimal::new(99, 2));
        }

        // Last point pinned to the live price.
        assert_eq!(series.points.last().unwrap().price, Decimal::new(62, 2));
    }

    #[test]
    fn test_synthetic_timestamps_ascend() {
        let series = synthetic_series(Interval::Day, Decimal::new(5, 1), "test".into());
        for pair in series.points.windows(2) {
            assert!(pair[0].timestamp_ms < pair[1].timestamp_ms);
        }
    }
}
