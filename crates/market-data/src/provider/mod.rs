//! Market data provider abstraction and the HTTP implementation.
//!
//! The core services never construct a client themselves: they receive an
//! `Arc<dyn MarketDataProvider>`, which keeps them testable with in-memory
//! providers.

mod traits;

pub mod iex;

pub use iex::{IexEndpoints, IexProvider};
pub use traits::MarketDataProvider;
