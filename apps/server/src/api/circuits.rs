use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{extract::State, routing::get, Json, Router};
use quotes_market_data::CircuitMetrics;

/// Breaker state and rolling-window counts for every operation kind.
async fn get_circuits(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<CircuitMetrics>>> {
    Ok(Json(state.quote_service.circuit_metrics()))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/circuits", get(get_circuits))
}
