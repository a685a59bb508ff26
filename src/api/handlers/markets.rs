use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::polymarket::{categories, history, normalize, types::GammaMarket};
use crate::AppState;

use super::ApiResponse;

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;
const SEARCH_BATCH: u32 = 1000;

#[derive(Debug, Deserialize)]
pub struct MarketsQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub category: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MarketsPage {
    pub markets: Vec<normalize::Market>,
    pub count: usize,
}

/// List or search active markets.
///
/// Search understands full Polymarket event URLs, bare event slugs and hex
/// market IDs in addition to free-text queries. Upstream failures degrade
/// to an empty page so the listing never 500s on a feed hiccup.
pub async fn list_markets(
    State(state): State<AppState>,
    Query(query): Query<MarketsQuery>,
) -> Json<ApiResponse<MarketsPage>> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT);
    // Bounded so the upstream fetch size below always fits in u32.
    let offset = query.offset.unwrap_or(0).min(MAX_LIMIT * 10);
    let category = query.category.as_deref().unwrap_or("");

    let raw = match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => search_markets(&state, q).await,
        None => {
            // Over-fetch so category filtering still fills the page.
            let fetch = if category.is_empty() {
                (limit + offset + 100).max(500)
            } else {
                SEARCH_BATCH as usize
            };
            match state.gamma.get_active_markets(fetch as u32, 0).await {
                Ok(markets) => markets,
                Err(e) => {
                    tracing::warn!(error = %e, "Market listing fetch failed; serving empty page");
                    Vec::new()
                }
            }
        }
    };

    let mut markets: Vec<normalize::Market> = raw
        .iter()
        .map(normalize::normalize)
        .filter(|m| !m.id.is_empty())
        .collect();

    if !category.is_empty() {
        markets.retain(|m| categories::matches_category(m, category));
    }

    let count = markets.len();
    let page: Vec<normalize::Market> = markets.into_iter().skip(offset).take(limit).collect();

    Json(ApiResponse::ok(MarketsPage {
        markets: page,
        count,
    }))
}

/// Resolve a search query against the Gamma API. Tries, in order: event
/// slug lookup (from a URL or slug-shaped query), direct market ID fetch
/// for hex IDs, then substring matching over a fetched batch.
async fn search_markets(state: &AppState, q: &str) -> Vec<GammaMarket> {
    if let Some(slug) = extract_slug(q) {
        match state.gamma.get_events_by_slug(&slug).await {
            Ok(events) => {
                let markets: Vec<GammaMarket> =
                    events.into_iter().flat_map(|e| e.markets).collect();
                if !markets.is_empty() {
                    return markets;
                }
            }
            Err(e) => tracing::warn!(error = %e, slug, "Event slug lookup failed"),
        }
    }

    if is_hex_id(q) {
        match state.gamma.get_market(q).await {
            Ok(market) => return vec![market],
            Err(e) => tracing::debug!(error = %e, q, "Direct market lookup failed"),
        }
    }

    let batch = match state.gamma.get_active_markets(SEARCH_BATCH, 0).await {
        Ok(markets) => markets,
        Err(e) => {
            tracing::warn!(error = %e, "Market search fetch failed");
            return Vec::new();
        }
    };

    let needle = q.to_lowercase();
    batch
        .into_iter()
        .filter(|m| {
            m.question
                .as_deref()
                .is_some_and(|s| s.to_lowercase().contains(&needle))
                || m.description
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
                || m.slug
                    .as_deref()
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Pull an event slug out of a Polymarket URL, or treat a slug-shaped
/// query (dashes, no spaces, not a hex ID) as a slug directly.
fn extract_slug(q: &str) -> Option<String> {
    if let Some(idx) = q.find("polymarket.com/event/") {
        let rest = &q[idx + "polymarket.com/event/".len()..];
        let slug = rest
            .split(['?', '#', '/'])
            .next()
            .unwrap_or_default()
            .trim();
        if !slug.is_empty() {
            return Some(slug.to_string());
        }
    }

    if q.contains('-') && !q.contains(' ') && !is_hex_id(q) {
        return Some(q.to_string());
    }

    None
}

/// Market and condition IDs are long hex strings, optionally 0x-prefixed.
fn is_hex_id(q: &str) -> bool {
    let body = q.strip_prefix("0x").unwrap_or(q);
    body.len() >= 10 && body.chars().all(|c| c.is_ascii_hexdigit())
}

pub async fn get_market(
    State(state): State<AppState>,
    Path(market_id): Path<String>,
) -> Result<Json<ApiResponse<normalize::Market>>, AppError> {
    let raw = state
        .gamma
        .get_market(&market_id)
        .await
        .map_err(|e| AppError::NotFound(format!("Market not found: {e}")))?;

    Ok(Json(ApiResponse::ok(normalize::normalize(&raw))))
}

#[derive(Debug, Serialize)]
pub struct MarketPrice {
    pub market_id: String,
    pub yes_price: Decimal,
    pub no_price: Decimal,
    pub volume: Decimal,
    pub liquidity: Decimal,
}

pub async fn get_price(
    State(state): State<AppState>,
    Path(market_id): Path<String>,
) -> Result<Json<ApiResponse<MarketPrice>>, AppError> {
    let raw = state
        .gamma
        .get_market(&market_id)
        .await
        .map_err(|e| AppError::MarketDataUnavailable(e.to_string()))?;

    let market = normalize::normalize(&raw);

    Ok(Json(ApiResponse::ok(MarketPrice {
        market_id: market.id,
        yes_price: market.yes_price,
        no_price: market.no_price,
        volume: market.volume,
        liquidity: market.liquidity,
    })))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub interval: Option<String>,
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(market_id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<history::PriceSeries>>, AppError> {
    let interval_str = query.interval.as_deref().unwrap_or("1m");
    let interval = history::Interval::from_api_str(interval_str)
        .ok_or_else(|| AppError::BadRequest(format!("Unknown interval: {interval_str}")))?;

    let series =
        history::fetch_price_history(&state.gamma, &state.clob, &market_id, interval).await;

    if series.is_synthetic() {
        metrics::counter!("synthetic_price_series_total").increment(1);
    }

    Ok(Json(ApiResponse::ok(series)))
}
