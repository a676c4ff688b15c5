use std::sync::Arc;

use crate::{error::ApiResult, main_lib::AppState};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use quotes_market_data::CompanyInfo;

#[derive(serde::Deserialize)]
struct QuotesQuery {
    q: Option<String>,
}

/// Split a comma-delimited symbol list, trimming whitespace and dropping
/// empty segments.
fn parse_symbols(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

async fn get_quotes(
    State(state): State<Arc<AppState>>,
    Query(q): Query<QuotesQuery>,
) -> ApiResult<impl IntoResponse> {
    let symbols = parse_symbols(q.q.as_deref());
    let quotes = state.quote_service.get_quotes(&symbols).await?;
    Ok(([(header::CACHE_CONTROL, "no-cache")], Json(quotes)))
}

async fn search_companies(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CompanyInfo>>> {
    let companies = state.quote_service.search(&name).await;
    Ok(Json(companies))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/quotes", get(get_quotes))
        .route("/company/{name}", get(search_companies))
}
