//! Core business logic abstractions

pub mod asset;
pub mod clock;
pub mod config;
pub mod csv;
pub mod history;
pub mod log;
pub mod quote;
pub mod store;
pub mod valuation;

// Re-export main types for cleaner imports
pub use asset::{Asset, Category, Currency, Market};
pub use clock::{Clock, SystemClock};
pub use history::{History, Snapshot};
pub use quote::{FxRateProvider, QuoteCache, QuoteProvider};
pub use store::Store;
pub use valuation::{PortfolioValuation, value_portfolio};
