use reqwest::Client;
use thiserror::Error;

use super::types::{GammaEvent, GammaMarket};

const GAMMA_API_BASE: &str = "https://gamma-api.polymarket.com";

#[derive(Debug, Error)]
pub enum GammaClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

#[derive(Debug, Clone)]
pub struct GammaClient {
    http: Client,
    base_url: String,
}

impl Default for GammaClient {
    fn default() -> Self {
        Self::new(Client::new(), GAMMA_API_BASE)
    }
}

impl GammaClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch active markets from the Gamma API with pagination.
    pub async fn get_active_markets(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<GammaMarket>, GammaClientError> {
        let url = format!("{}/markets", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("active", "true"),
                ("closed", "false"),
                ("limit", &limit.to_string()),
                ("offset", &offset.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let markets: Vec<GammaMarket> = resp.json().await?;
        Ok(markets)
    }

    /// Fetch a single market by ID or condition ID.
    pub async fn get_market(&self, market_id: &str) -> Result<GammaMarket, GammaClientError> {
        let url = format!("{}/markets/{}", self.base_url, market_id);
        let resp = self.http.get(&url).send().await?.error_for_status()?;

        let market: GammaMarket = resp.json().await?;
        Ok(market)
    }

    /// Look up events by slug; each event carries its markets.
    pub async fn get_events_by_slug(
        &self,
        slug: &str,
    ) -> Result<Vec<GammaEvent>, GammaClientError> {
        let url = format!("{}/events", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("slug", slug)])
            .send()
            .await?
            .error_for_status()?;

        let events: Vec<GammaEvent> = resp.json().await?;
        Ok(events)
    }
}
