use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const CLOB_API_BASE: &str = "https://clob.polymarket.com";

#[derive(Debug, Error)]
pub enum ClobClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Unexpected(String),
}

/// One sample from the prices-history endpoint: unix seconds + price.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPricePoint {
    pub t: i64,
    pub p: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct PricesHistoryResponse {
    #[serde(default)]
    history: Vec<RawPricePoint>,
}

#[derive(Debug, Clone)]
pub struct ClobClient {
    http: Client,
    base_url: String,
}

impl Default for ClobClient {
    fn default() -> Self {
        Self::new(Client::new(), CLOB_API_BASE)
    }
}

impl ClobClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Fetch the price history for one outcome token. `fidelity` is the
    /// sample spacing in minutes.
    pub async fn get_price_history(
        &self,
        token_id: &str,
        fidelity: u32,
    ) -> Result<Vec<RawPricePoint>, ClobClientError> {
        let url = format!("{}/prices-history", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[
                ("market", token_id),
                ("interval", "max"),
                ("fidelity", &fidelity.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: PricesHistoryResponse = resp.json().await?;
        Ok(body.history)
    }
}
