use axum::extract::State;

use crate::AppState;

/// Prometheus text exposition of all registered metrics.
pub async fn render_metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}
