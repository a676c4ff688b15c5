//! IEX-style market data provider implementation.
//!
//! Talks to three endpoints configured as URL templates:
//! - single quote, with a `{symbol}` placeholder
//! - batch quote, with a `{symbols}` placeholder (comma-delimited list)
//! - company search, with a `{name}` placeholder
//!
//! HTTP 404 and empty bodies mean "not found"; every other non-success
//! status is a provider error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::errors::MarketDataError;
use crate::models::{BatchUpstreamResponse, UpstreamCompany, UpstreamQuote};
use crate::provider::MarketDataProvider;

const PROVIDER_ID: &str = "IEX";
const DEFAULT_BASE_URL: &str = "https://cloud.iexapis.com/stable";
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

pub const SYMBOL_PLACEHOLDER: &str = "{symbol}";
pub const SYMBOLS_PLACEHOLDER: &str = "{symbols}";
pub const NAME_PLACEHOLDER: &str = "{name}";

// ============================================================================
// Endpoints
// ============================================================================

/// URL templates for the three upstream lookups.
#[derive(Clone, Debug)]
pub struct IexEndpoints {
    pub quote_url: String,
    pub batch_url: String,
    pub company_url: String,
    /// API token sent as the `token` query parameter, if set.
    pub token: Option<String>,
}

impl Default for IexEndpoints {
    fn default() -> Self {
        Self {
            quote_url: format!("{DEFAULT_BASE_URL}/stock/{SYMBOL_PLACEHOLDER}/quote"),
            batch_url: format!(
                "{DEFAULT_BASE_URL}/stock/market/batch?symbols={SYMBOLS_PLACEHOLDER}&types=quote"
            ),
            company_url: format!("{DEFAULT_BASE_URL}/search/{NAME_PLACEHOLDER}"),
            token: None,
        }
    }
}

impl IexEndpoints {
    fn quote(&self, symbol: &str) -> String {
        expand_template(&self.quote_url, SYMBOL_PLACEHOLDER, symbol)
    }

    fn batch(&self, symbols: &[String]) -> String {
        let joined = symbols
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        self.batch_url.replace(SYMBOLS_PLACEHOLDER, &joined)
    }

    fn company(&self, name: &str) -> String {
        expand_template(&self.company_url, NAME_PLACEHOLDER, name)
    }
}

/// Substitute a URL-encoded `value` for `placeholder` in `template`.
pub fn expand_template(template: &str, placeholder: &str, value: &str) -> String {
    template.replace(placeholder, &urlencoding::encode(value))
}

// ============================================================================
// IexProvider
// ============================================================================

/// HTTP market data provider.
pub struct IexProvider {
    client: Client,
    endpoints: IexEndpoints,
}

impl IexProvider {
    /// Create a provider with its own HTTP client.
    pub fn new(endpoints: IexEndpoints) -> Self {
        let client = Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self::with_client(client, endpoints)
    }

    /// Create a provider around an existing client.
    pub fn with_client(client: Client, endpoints: IexEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// GET `url`; `Ok(None)` on 404 or an empty body.
    async fn fetch(&self, url: &str) -> Result<Option<String>, MarketDataError> {
        let mut request = self.client.get(url);

        if let Some(token) = &self.endpoints.token {
            request = request.query(&[("token", token)]);
        }

        debug!("IEX request: {}", url);

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                MarketDataError::Timeout {
                    operation: format!("{PROVIDER_ID} request"),
                }
            } else {
                warn!("IEX request to {} failed: {}", url, e);
                MarketDataError::Network(e)
            }
        })?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("IEX returned 404 for {}", url);
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP {} - {}", status, body),
            });
        }

        let text = response.text().await?;

        if text.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(text))
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for IexProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn get_quote(&self, symbol: &str) -> Result<Option<UpstreamQuote>, MarketDataError> {
        debug!("Fetching quote for {} from IEX", symbol);

        match self.fetch(&self.endpoints.quote(symbol)).await? {
            Some(text) => parse_quote(&text),
            None => Ok(None),
        }
    }

    async fn get_quotes(
        &self,
        symbols: &[String],
    ) -> Result<BatchUpstreamResponse, MarketDataError> {
        if symbols.is_empty() {
            return Ok(BatchUpstreamResponse::new());
        }

        debug!("Fetching batch of {} quotes from IEX", symbols.len());

        let response = match self.fetch(&self.endpoints.batch(symbols)).await? {
            Some(text) => parse_batch(&text)?,
            None => BatchUpstreamResponse::new(),
        };

        if response.len() < symbols.len() {
            warn!(
                "IEX resolved {} of {} requested symbols",
                response.len(),
                symbols.len()
            );
        }

        Ok(response)
    }

    async fn search_companies(
        &self,
        name: &str,
    ) -> Result<Vec<UpstreamCompany>, MarketDataError> {
        debug!("Searching IEX companies for '{}'", name);

        match self.fetch(&self.endpoints.company(name)).await? {
            Some(text) => parse_companies(&text),
            None => Ok(Vec::new()),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_error(what: &str, e: serde_json::Error) -> MarketDataError {
    MarketDataError::ProviderError {
        provider: PROVIDER_ID.to_string(),
        message: format!("Failed to parse {} response: {}", what, e),
    }
}

/// A `null` body is an unknown symbol.
fn parse_quote(text: &str) -> Result<Option<UpstreamQuote>, MarketDataError> {
    serde_json::from_str::<Option<UpstreamQuote>>(text).map_err(|e| parse_error("quote", e))
}

fn parse_batch(text: &str) -> Result<BatchUpstreamResponse, MarketDataError> {
    serde_json::from_str::<Option<BatchUpstreamResponse>>(text)
        .map(Option::unwrap_or_default)
        .map_err(|e| parse_error("batch", e))
}

fn parse_companies(text: &str) -> Result<Vec<UpstreamCompany>, MarketDataError> {
    serde_json::from_str::<Option<Vec<UpstreamCompany>>>(text)
        .map(Option::unwrap_or_default)
        .map_err(|e| parse_error("company search", e))
}

// ============================================================================
// Tests
// ============================================================================
