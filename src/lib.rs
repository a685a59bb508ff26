pub mod api;
pub mod config;
pub mod db;
pub mod errors;
pub mod ledger;
pub mod metrics;
pub mod models;
pub mod polymarket;
pub mod services;

use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::polymarket::{ClobClient, GammaClient};

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: AppConfig,
    pub gamma: GammaClient,
    pub clob: ClobClient,
    pub metrics_handle: PrometheusHandle,
}
