use crate::api::{ClosingSeries, MarketData};
use crate::cache::PriceCache;
use crate::error::{Error, Result};
use crate::period::Period;
use crate::symbols::SymbolMap;
use crate::table::{PriceTable, SkippedSymbol};
use futures::{stream, StreamExt};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, trace, warn};

/// What to do when one symbol of a table cannot be fetched. Either way the
/// policy applies to every symbol alike.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Fail the whole table, naming the symbol.
    #[default]
    Abort,
    /// Leave the row out, log a warning, and list it in [`PriceTable::skipped`].
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(Error::Config(format!(
                "unrecognised fetch failure policy: {other} (expected `abort` or `skip`)"
            ))),
        }
    }
}

/// Assembles price tables from a [`MarketData`] source, memoizing every
/// table it builds.
pub struct PriceFetcher<M> {
    source: M,
    cache: PriceCache,
    policy: FailurePolicy,
    concurrency: usize,
}

impl<M: MarketData> PriceFetcher<M> {
    pub fn new(source: M) -> Self {
        Self {
            source,
            cache: PriceCache::new(),
            policy: FailurePolicy::default(),
            concurrency: num_cpus::get(),
        }
    }

    pub fn policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upper bound on requests in flight; clamped to at least one.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn source(&self) -> &M {
        &self.source
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    /// One row per symbol, in symbol map order.
    ///
    /// Complete tables are cached per `(period, symbols)`; a repeated call
    /// returns the same table without touching the source. A table missing
    /// skipped symbols is returned but not cached, so the next call retries.
    pub async fn fetch_prices(&self, period: Period, symbols: &SymbolMap) -> Result<Arc<PriceTable>> {
        if let Some(table) = self.cache.get(period, symbols) {
            debug!("cache hit for {period} over {} symbols", symbols.len());
            return Ok(table);
        }
        debug!("cache miss for {period} over {} symbols", symbols.len());

        let time = std::time::Instant::now();
        let table = self.assemble(period, symbols).await?;
        debug!(
            "{} of prices assembled for {} companies. Elapsed time: {} ms",
            period,
            table.len(),
            time.elapsed().as_millis()
        );

        if !table.skipped().is_empty() {
            debug!("{} symbols skipped; {period} table not cached", table.skipped().len());
            return Ok(Arc::new(table));
        }
        Ok(self.cache.insert(period, symbols, table))
    }

    async fn assemble(&self, period: Period, symbols: &SymbolMap) -> Result<PriceTable> {
        // `buffered` yields in input order, so rows keep the symbol map's order
        let results: Vec<(&str, &str, Result<ClosingSeries>)> = stream::iter(symbols.iter())
            .map(|(name, ticker)| async move {
                trace!("requesting [{ticker}] {name}");
                (name, ticker, self.source.closing_prices(ticker, period).await)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut table = PriceTable::new();
        for (name, ticker, result) in results {
            match result {
                Ok(series) => {
                    trace!("[{ticker}] {name}: {} sessions", series.len());
                    table.push_row(name, &series);
                }
                Err(e) => match self.policy {
                    FailurePolicy::Abort => {
                        error!("[{ticker}] {name} failed; abandoning {period} table: {e}");
                        return Err(Error::Fetch {
                            name: name.to_string(),
                            ticker: ticker.to_string(),
                            source: Box::new(e),
                        });
                    }
                    FailurePolicy::Skip => {
                        warn!("[{ticker}] {name} skipped: {e}");
                        table.record_skipped(SkippedSymbol {
                            name: name.to_string(),
                            ticker: ticker.to_string(),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }
        Ok(table)
    }
}
