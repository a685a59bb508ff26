use serde::{Deserialize, Serialize};

/// Raw market object as returned by the Gamma API. Field shapes are
/// deliberately loose: outcomePrices/outcomes arrive as JSON-encoded
/// strings or as arrays, volume/liquidity as strings or numbers.
/// `normalize::normalize` turns this into the canonical shape.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GammaMarket {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "conditionId")]
    pub condition_id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub events: Vec<GammaEvent>,
    #[serde(default, alias = "outcomePrices")]
    pub outcome_prices: Option<serde_json::Value>,
    #[serde(default)]
    pub outcomes: Option<serde_json::Value>,
    #[serde(default)]
    pub volume: Option<serde_json::Value>,
    #[serde(default)]
    pub liquidity: Option<serde_json::Value>,
    #[serde(default, alias = "endDate")]
    pub end_date: Option<String>,
    #[serde(default, alias = "endDateIso")]
    pub end_date_iso: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<serde_json::Value>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub closed: Option<bool>,
    /// Stringified JSON array of token IDs, e.g. "[\"token1\", \"token2\"]".
    #[serde(default, alias = "clobTokenIds")]
    pub clob_token_ids: Option<String>,
    #[serde(default)]
    pub tokens: Vec<GammaToken>,
}

impl GammaMarket {
    /// Parse the stringified clobTokenIds into a Vec of token ID strings.
    pub fn parse_token_ids(&self) -> Vec<String> {
        self.clob_token_ids
            .as_deref()
            .and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
            .unwrap_or_default()
    }
}

/// Outcome token on a resolved or resolving market.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GammaToken {
    #[serde(default)]
    pub outcome: String,
    #[serde(default)]
    pub winner: Option<bool>,
}

/// Event wrapper; slug searches return events that carry their markets.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GammaEvent {
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub markets: Vec<GammaMarket>,
}
