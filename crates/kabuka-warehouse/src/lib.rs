//! Closing price history for a fixed set of companies, shaped for charting.
//!
//! ```rust,ignore
//! let dashboard = Dashboard::new(
//!     SymbolMap::default(),
//!     PriceFetcher::new(Yahoo::with_user_agent(DEFAULT_USER_AGENT)?),
//! );
//! let view = dashboard.render(&Controls::default()).await?;
//! ```
pub mod api;
pub mod cache;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod fetch;
pub mod period;
pub mod schema;
pub mod symbols;
pub mod table;

pub use api::{ClosingSeries, MarketData, MemorySource};
pub use chart::{ChartSpec, PriceRange};
pub use config::{Config, DEFAULT_USER_AGENT};
pub use dashboard::{Controls, Dashboard, View};
pub use error::{Error, Result};
pub use fetch::{FailurePolicy, PriceFetcher};
pub use period::{select_period, Period};
pub use schema::yahoo::Yahoo;
pub use symbols::SymbolMap;
pub use table::{PriceRecord, PriceTable};
