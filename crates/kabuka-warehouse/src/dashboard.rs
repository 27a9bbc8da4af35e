use crate::api::MarketData;
use crate::chart::{ChartSpec, PriceRange};
use crate::error::Result;
use crate::fetch::PriceFetcher;
use crate::period::{select_period, Period};
use crate::symbols::SymbolMap;
use crate::table::PriceTable;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// Companies preselected in a fresh dashboard, when the symbol map has them.
pub const DEFAULT_SELECTION: [&str; 3] = ["google", "apple", "TOYOTA"];

/// Shown instead of a chart when nothing is selected.
pub const EMPTY_SELECTION_MESSAGE: &str = "Select at least one company.";

/// Lookback window bounds offered by the day-count controls.
pub const MIN_DAYS: i64 = 1;
pub const MAX_DAYS: i64 = 3650;
pub const DEFAULT_DAYS: i64 = 30;

/// The state of every control at the moment of one re-render.
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub days: i64,
    pub range: PriceRange,
    pub companies: Vec<String>,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            days: DEFAULT_DAYS,
            range: PriceRange::default(),
            companies: DEFAULT_SELECTION.iter().map(|name| name.to_string()).collect(),
        }
    }
}

/// Outcome of one pipeline run.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum View {
    Chart { period: Period, chart: ChartSpec },
    EmptySelection { message: String },
}

impl View {
    pub fn chart(&self) -> Option<&ChartSpec> {
        match self {
            View::Chart { chart, .. } => Some(chart),
            View::EmptySelection { .. } => None,
        }
    }
}

/// Period selection, fetching, filtering, and reshaping wired into one
/// pipeline, rerun on every control change. The fetcher's memo table keeps
/// reruns from refetching.
pub struct Dashboard<M> {
    symbols: SymbolMap,
    fetcher: PriceFetcher<M>,
}

impl<M: MarketData> Dashboard<M> {
    pub fn new(symbols: SymbolMap, fetcher: PriceFetcher<M>) -> Self {
        Self { symbols, fetcher }
    }

    pub fn symbols(&self) -> &SymbolMap {
        &self.symbols
    }

    pub fn fetcher(&self) -> &PriceFetcher<M> {
        &self.fetcher
    }

    pub async fn table(&self, days: i64) -> Result<Arc<PriceTable>> {
        self.fetcher
            .fetch_prices(select_period(days), &self.symbols)
            .await
    }

    /// Names the company selector offers for a lookback of `days`.
    pub async fn companies(&self, days: i64) -> Result<Vec<String>> {
        let table = self.table(days).await?;
        Ok(table.companies().into_iter().map(String::from).collect())
    }

    /// [`DEFAULT_SELECTION`] restricted to what the table actually holds.
    pub async fn default_selection(&self, days: i64) -> Result<Vec<String>> {
        let table = self.table(days).await?;
        Ok(DEFAULT_SELECTION
            .iter()
            .filter(|name| table.row(name).is_some())
            .map(|name| name.to_string())
            .collect())
    }

    pub async fn render(&self, controls: &Controls) -> Result<View> {
        if controls.companies.is_empty() {
            info!("no companies selected; skipping chart");
            return Ok(View::EmptySelection {
                message: EMPTY_SELECTION_MESSAGE.to_string(),
            });
        }

        let period = select_period(controls.days);
        let table = self.fetcher.fetch_prices(period, &self.symbols).await?;
        let records = table.select(controls.companies.as_slice())?.transpose().melt();
        debug!(
            "{} records charted for {:?} over {period}",
            records.len(),
            controls.companies
        );

        Ok(View::Chart {
            period,
            chart: ChartSpec::new(records, controls.range),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MemorySource;
    use crate::error::Error;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn dashboard() -> Dashboard<MemorySource> {
        let source = MemorySource::new()
            .with_series("AAPL", vec![(day(2), Some(185.64)), (day(3), Some(184.25))])
            .with_series("GOOGL", vec![(day(2), Some(138.17)), (day(3), Some(138.92))]);
        let symbols = SymbolMap::new([("apple", "AAPL"), ("google", "GOOGL")]).unwrap();
        Dashboard::new(symbols, PriceFetcher::new(source))
    }

    fn controls(companies: &[&str]) -> Controls {
        Controls {
            days: 30,
            companies: companies.iter().map(|name| name.to_string()).collect(),
            ..Controls::default()
        }
    }

    #[tokio::test]
    async fn single_company_charts_one_series() {
        let dashboard = dashboard();
        assert_eq!(dashboard.table(30).await.unwrap().len(), 2);

        let view = dashboard.render(&controls(&["apple"])).await.unwrap();
        let View::Chart { period, chart } = view else {
            panic!("expected a chart");
        };
        assert_eq!(period, Period::OneMonth);
        assert_eq!(chart.series(), ["apple"]);
        assert_eq!(chart.records.len(), 2);
    }

    #[tokio::test]
    async fn empty_selection_renders_no_chart() {
        let dashboard = dashboard();
        let view = dashboard.render(&controls(&[])).await.unwrap();
        assert_eq!(
            view,
            View::EmptySelection {
                message: EMPTY_SELECTION_MESSAGE.to_string()
            }
        );
        assert!(view.chart().is_none());
        assert_eq!(dashboard.fetcher().source().requests(), 0);
    }

    #[tokio::test]
    async fn unknown_company_is_an_error() {
        let err = dashboard().render(&controls(&["sony"])).await.unwrap_err();
        assert!(matches!(err, Error::UnknownCompany(name) if name == "sony"));
    }

    #[tokio::test]
    async fn reruns_reuse_fetched_prices() {
        let dashboard = dashboard();
        dashboard.render(&controls(&["apple"])).await.unwrap();
        dashboard.render(&controls(&["apple", "google"])).await.unwrap();
        // 6 and 30 days share the same bucket
        dashboard
            .render(&Controls { days: 6, ..controls(&["google"]) })
            .await
            .unwrap();
        assert_eq!(dashboard.fetcher().source().requests(), 2);
    }

    #[tokio::test]
    async fn default_selection_skips_missing_companies() {
        let dashboard = dashboard();
        assert_eq!(dashboard.default_selection(30).await.unwrap(), ["google", "apple"]);
        assert_eq!(dashboard.companies(30).await.unwrap(), ["apple", "google"]);
    }
}
