//! Prometheus metrics endpoint

use crate::server::AppState;
use axum::extract::State;

pub async fn render(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}
