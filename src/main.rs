use polyleagues::api::router::create_router;
use polyleagues::config::AppConfig;
use polyleagues::db;
use polyleagues::metrics::init_metrics;
use polyleagues::polymarket::{ClobClient, GammaClient};
use polyleagues::services::{price_updater, rankings, settlement};
use polyleagues::AppState;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::init_pool(&config.database_url).await?;
    tracing::info!("Database connected");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations applied");

    let metrics_handle = init_metrics();

    let http = reqwest::Client::new();
    let gamma = GammaClient::new(http.clone(), config.gamma_api_url.clone());
    let clob = ClobClient::new(http, config.clob_api_url.clone());

    if config.pollers_enabled {
        tokio::spawn(price_updater::run_price_poller(
            pool.clone(),
            gamma.clone(),
            config.price_update_interval_secs,
        ));
        tokio::spawn(settlement::run_settlement_poller(
            pool.clone(),
            gamma.clone(),
            config.settlement_interval_secs,
        ));
        tokio::spawn(rankings::run_ranking_poller(
            pool.clone(),
            config.ranking_interval_secs,
        ));
        tracing::info!("Background pollers started");
    } else {
        tracing::info!("Background pollers disabled");
    }

    let state = AppState {
        db: pool,
        config: config.clone(),
        gamma,
        clob,
        metrics_handle,
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
