use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::fallback;
use crate::mapper;
use crate::models::CompanyInfo;
use crate::provider::MarketDataProvider;
use crate::resilience::{execute_guarded, CircuitBreaker, OperationKind};

/// Company lookup through the company-search circuit.
pub struct CompanySearch {
    provider: Arc<dyn MarketDataProvider>,
    breaker: Arc<CircuitBreaker>,
    timeout: Option<Duration>,
}

impl CompanySearch {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        breaker: Arc<CircuitBreaker>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            provider,
            breaker,
            timeout,
        }
    }

    /// Companies whose name or symbol matches `name`, in upstream order.
    ///
    /// Falls back to a single placeholder company for `name` when the
    /// upstream is unavailable.
    pub async fn search(&self, name: &str) -> Vec<CompanyInfo> {
        debug!("Retrieving company info for: {}", name);

        let call = self.provider.search_companies(name);
        match execute_guarded(&self.breaker, OperationKind::CompanySearch, self.timeout, call)
            .await
        {
            Ok(records) => {
                let companies: Vec<CompanyInfo> =
                    records.iter().filter_map(mapper::map_company).collect();
                if companies.len() < records.len() {
                    debug!(
                        "Dropped {} company records without a symbol",
                        records.len() - companies.len()
                    );
                }
                companies
            }
            Err(e) => {
                warn!(
                    "Upstream unavailable for company search '{}' ({}), returning fallback",
                    name, e
                );
                vec![fallback::synthesize_company(name)]
            }
        }
    }
}
