//! Market data models
//!
//! - `quote` - Internal quote returned to callers (Quote, QuoteStatus)
//! - `company` - Company search result (CompanyInfo)
//! - `upstream` - Provider wire records (UpstreamQuote, BatchUpstreamResponse, UpstreamCompany)

mod company;
mod quote;
mod upstream;

pub use company::CompanyInfo;
pub use quote::{Quote, QuoteStatus};
pub use upstream::{BatchEntry, BatchUpstreamResponse, UpstreamCompany, UpstreamQuote};
