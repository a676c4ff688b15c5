use std::{net::SocketAddr, time::Duration};

use anyhow::Context;
use quotes_market_data::{CircuitBreakerConfig, IexEndpoints, ResilienceConfig};

pub struct Config {
    pub listen_addr: SocketAddr,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub endpoints: IexEndpoints,
    pub resilience: ResilienceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_allow: vec!["*".to_string()],
            request_timeout: Duration::from_millis(30000),
            endpoints: IexEndpoints::default(),
            resilience: ResilienceConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        let listen_addr = match std::env::var("QUOTES_LISTEN_ADDR") {
            Ok(addr) => addr
                .parse()
                .with_context(|| format!("Invalid QUOTES_LISTEN_ADDR: {addr}"))?,
            Err(_) => defaults.listen_addr,
        };
        let cors_allow = std::env::var("QUOTES_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let request_timeout =
            env_millis("QUOTES_REQUEST_TIMEOUT_MS").unwrap_or(defaults.request_timeout);

        let endpoints = IexEndpoints {
            quote_url: env_string("QUOTES_QUOTE_URL").unwrap_or(defaults.endpoints.quote_url),
            batch_url: env_string("QUOTES_BATCH_URL").unwrap_or(defaults.endpoints.batch_url),
            company_url: env_string("QUOTES_COMPANY_URL")
                .unwrap_or(defaults.endpoints.company_url),
            token: env_string("QUOTES_API_TOKEN"),
        };

        let breaker_defaults = CircuitBreakerConfig::default();
        let breaker = CircuitBreakerConfig {
            request_volume_threshold: env_parse("QUOTES_BREAKER_VOLUME_THRESHOLD")
                .unwrap_or(breaker_defaults.request_volume_threshold),
            error_threshold_percentage: env_parse::<u8>("QUOTES_BREAKER_ERROR_PERCENT")
                .map(|p| p.min(100))
                .unwrap_or(breaker_defaults.error_threshold_percentage),
            rolling_window: env_millis("QUOTES_BREAKER_WINDOW_MS")
                .unwrap_or(breaker_defaults.rolling_window),
            sleep_window: env_millis("QUOTES_BREAKER_SLEEP_MS")
                .unwrap_or(breaker_defaults.sleep_window),
        };
        let resilience = ResilienceConfig {
            breaker,
            quote_timeout: env_millis("QUOTES_QUOTE_TIMEOUT_MS")
                .or(defaults.resilience.quote_timeout),
            batch_timeout: env_millis("QUOTES_BATCH_TIMEOUT_MS")
                .or(defaults.resilience.batch_timeout),
            search_timeout: env_millis("QUOTES_SEARCH_TIMEOUT_MS"),
        };

        Ok(Self {
            listen_addr,
            cors_allow,
            request_timeout,
            endpoints,
            resilience,
        })
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Unparsable values fall back to the default.
fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.trim().parse().ok())
}

fn env_millis(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_millis)
}
