use crate::error::{Error, Result};
use crate::period::Period;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

pub type HttpClient = reqwest::Client;

/// Closing prices of one ticker, in date order. `None` marks a session the
/// source reported without a close.
pub type ClosingSeries = Vec<(NaiveDate, Option<f64>)>;

/// Source of historical closing prices.
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn closing_prices(&self, ticker: &str, period: Period) -> Result<ClosingSeries>;
}

#[async_trait]
impl<M: MarketData + ?Sized> MarketData for Arc<M> {
    async fn closing_prices(&self, ticker: &str, period: Period) -> Result<ClosingSeries> {
        (**self).closing_prices(ticker, period).await
    }
}

// -------------------------------------------------------------------------------------------------

/// Fixed, in-memory price source that counts the requests it serves.
///
/// Every period returns the full series registered for a ticker; unknown
/// tickers fail the way a delisted symbol does upstream.
#[derive(Default)]
pub struct MemorySource {
    series: HashMap<String, ClosingSeries>,
    requests: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, ticker: impl Into<String>, series: ClosingSeries) -> Self {
        self.series.insert(ticker.into(), series);
        self
    }

    /// Number of `closing_prices` calls served so far, failed ones included.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarketData for MemorySource {
    async fn closing_prices(&self, ticker: &str, period: Period) -> Result<ClosingSeries> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        trace!("serving [{ticker}] {period} from memory");
        self.series
            .get(ticker)
            .cloned()
            .ok_or_else(|| Error::MarketData {
                ticker: ticker.to_string(),
                message: "No data found, symbol may be delisted".to_string(),
            })
    }
}
