use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

use super::auth::require_auth;
use super::handlers;

pub fn create_router(state: AppState) -> Router {
    // Health and metrics stay open for probes and scrapers.
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render_metrics));

    let api = Router::new()
        // Leagues
        .route("/api/leagues", post(handlers::leagues::create_league))
        .route("/api/leagues/:id", get(handlers::leagues::get_league))
        .route("/api/leagues/:id/join", post(handlers::leagues::join_league))
        .route("/api/leagues/:id/members", get(handlers::leagues::get_members))
        .route(
            "/api/leagues/:id/update-rankings",
            post(handlers::leagues::update_rankings),
        )
        .route(
            "/api/leagues/update-all-rankings",
            post(handlers::leagues::update_all_rankings),
        )
        // Markets
        .route("/api/markets", get(handlers::markets::list_markets))
        .route("/api/markets/:id", get(handlers::markets::get_market))
        .route("/api/markets/:id/price", get(handlers::markets::get_price))
        .route("/api/markets/:id/history", get(handlers::markets::get_history))
        // Trades and positions
        .route("/api/trades", post(handlers::trades::execute_trade))
        .route(
            "/api/members/:id/positions",
            get(handlers::members::get_positions),
        )
        .route("/api/members/:id/trades", get(handlers::members::get_trades))
        .route(
            "/api/positions/update-prices",
            post(handlers::positions::update_prices),
        )
        .route("/api/positions/settle", post(handlers::positions::settle))
        // Achievements
        .route(
            "/api/achievements/check/:user_id",
            post(handlers::achievements::check_achievements),
        )
        .route(
            "/api/achievements/:user_id",
            get(handlers::achievements::get_achievements),
        )
        // Operations
        .route("/api/tasks/status", get(handlers::tasks::task_status))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
