use std::env;

const DEFAULT_GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";
const DEFAULT_CLOB_API_URL: &str = "https://clob.polymarket.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    /// Bearer token required on /api routes; None disables auth (dev mode).
    pub api_token: Option<String>,

    // Upstream market data endpoints (overridable for tests)
    pub gamma_api_url: String,
    pub clob_api_url: String,

    // Background maintenance
    pub pollers_enabled: bool,
    pub price_update_interval_secs: u64,
    pub settlement_interval_secs: u64,
    pub ranking_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8000".into())
                .parse()?,

            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),

            gamma_api_url: env::var("GAMMA_API_URL")
                .unwrap_or_else(|_| DEFAULT_GAMMA_API_URL.into()),
            clob_api_url: env::var("CLOB_API_URL")
                .unwrap_or_else(|_| DEFAULT_CLOB_API_URL.into()),

            pollers_enabled: env::var("POLLERS_ENABLED")
                .unwrap_or_else(|_| "true".into())
                .parse()
                .unwrap_or(true),
            price_update_interval_secs: parse_interval("PRICE_UPDATE_INTERVAL_SECS", 300),
            settlement_interval_secs: parse_interval("SETTLEMENT_INTERVAL_SECS", 600),
            ranking_interval_secs: parse_interval("RANKING_INTERVAL_SECS", 300),
        })
    }
}

fn parse_interval(var: &str, default: u64) -> u64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
