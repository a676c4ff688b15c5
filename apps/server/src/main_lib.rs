use std::sync::Arc;

use crate::config::Config;
use quotes_market_data::{IexProvider, MarketDataProvider, QuoteService};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub struct AppState {
    pub quote_service: Arc<QuoteService>,
}

pub fn init_tracing() {
    let log_format = std::env::var("QUOTES_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_state(config: &Config) -> Arc<AppState> {
    let provider = IexProvider::new(config.endpoints.clone());
    tracing::info!(
        "Upstream quote endpoint: {}, batch endpoint: {}, company endpoint: {}",
        config.endpoints.quote_url,
        config.endpoints.batch_url,
        config.endpoints.company_url
    );
    build_state_with_provider(config, Arc::new(provider))
}

/// Wire the service graph around an already constructed provider.
pub fn build_state_with_provider(
    config: &Config,
    provider: Arc<dyn MarketDataProvider>,
) -> Arc<AppState> {
    let quote_service = Arc::new(QuoteService::new(provider, config.resilience.clone()));
    Arc::new(AppState { quote_service })
}
