use crate::api::{ClosingSeries, HttpClient, MarketData};
use crate::error::{Error, Result};
use crate::period::Period;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::{Deserialize, Deserializer};
use tracing::{debug, error, trace};

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Daily closing prices from Yahoo Finance, per ticker
//
////////////////////////////////////////////////////////////////////////////////////////////////////

pub const BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const INTERVAL: &str = "1d";

pub struct Yahoo {
    http_client: HttpClient,
    base_url: String,
}

impl Yahoo {
    pub fn new(http_client: HttpClient) -> Self {
        Self {
            http_client,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Build a source with its own client, identified by `user_agent`.
    pub fn with_user_agent(user_agent: &str) -> Result<Self> {
        let http_client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .build()?;
        Ok(Self::new(http_client))
    }

    /// Point requests at another host serving the same chart API.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn url(&self, ticker: &str, period: Period) -> String {
        let tckr = ticker.to_uppercase();
        format!(
            "{}/{tckr}?symbol={tckr}&interval={INTERVAL}&range={period}",
            self.base_url
        )
    }
}

#[async_trait]
impl MarketData for Yahoo {
    async fn closing_prices(&self, ticker: &str, period: Period) -> Result<ClosingSeries> {
        let time = std::time::Instant::now();
        let url = self.url(ticker, period);

        trace!("fetching {period} of closing prices for [{ticker}] from Yahoo Finance");
        let response = self.http_client.get(&url).send().await.map_err(|e| {
            error!("[{ticker}] price fetching error: {e}\nURL: {url}");
            e
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            error!("[{ticker}] byte transformation error: {e}\nURL: {url}");
            e
        })?;

        trace!("deserializing price data for [{ticker}]");
        let history = match serde_json::from_slice::<PriceHistory>(&bytes) {
            Ok(history) => history,
            Err(_) if !status.is_success() => {
                error!("[{ticker}] request failed with status {status}\nURL: {url}");
                return Err(Error::Status {
                    ticker: ticker.to_string(),
                    status,
                });
            }
            Err(e) => {
                error!("[{ticker}] deserialization error: {e}\nURL: {url}");
                return Err(e.into());
            }
        };

        let series = history.into_closing_series(ticker)?;
        debug!(
            "[{ticker}] {} closes fetched. Elapsed time: {} ms",
            series.len(),
            time.elapsed().as_millis()
        );
        Ok(series)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//
// Deserialization
//
////////////////////////////////////////////////////////////////////////////////////////////////////

#[derive(Deserialize, Debug)]
pub struct PriceHistory {
    pub chart: PriceResponse,
}

#[derive(Deserialize, Debug)]
pub struct PriceResponse {
    pub result: Option<Vec<PriceCategories>>,
    pub error: Option<ChartError>,
}

#[derive(Deserialize, Debug)]
pub struct ChartError {
    pub code: String,
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct PriceCategories {
    #[serde(default)]
    pub meta: Meta,
    // absent when the range holds no sessions
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Deserialize, Debug, Default)]
pub struct Meta {
    /// Exchange offset from UTC, in seconds.
    #[serde(default)]
    pub gmtoffset: i32,
}

#[derive(Deserialize, Debug)]
pub struct Indicators {
    pub quote: Vec<Quote>,
}

#[derive(Deserialize, Debug)]
pub struct Quote {
    #[serde(default, deserialize_with = "de_nullable_prices")]
    pub close: Vec<Option<f64>>,
}

/// Yahoo pads sessions without a close with `null`.
fn de_nullable_prices<'de, D>(deserializer: D) -> std::result::Result<Vec<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let prices: Option<Vec<Option<f64>>> = Deserialize::deserialize(deserializer)?;
    Ok(prices.unwrap_or_default())
}

impl PriceHistory {
    /// Pair every session date with its close, in the exchange's local time.
    pub fn into_closing_series(self, ticker: &str) -> Result<ClosingSeries> {
        let market_error = |message: String| Error::MarketData {
            ticker: ticker.to_string(),
            message,
        };

        if let Some(e) = self.chart.error {
            error!("[{ticker}] Yahoo Finance reported {}: {}", e.code, e.description);
            return Err(market_error(format!("{}: {}", e.code, e.description)));
        }

        let base = self
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| {
                error!("[{ticker}] contained no \"chart.result\" object");
                market_error("response contained no chart result".to_string())
            })?;

        let offset = FixedOffset::east_opt(base.meta.gmtoffset)
            .ok_or_else(|| market_error(format!("invalid gmtoffset {}", base.meta.gmtoffset)))?;
        let closes = base
            .indicators
            .quote
            .into_iter()
            .next()
            .map(|quote| quote.close)
            .unwrap_or_default();

        base.timestamp
            .iter()
            .enumerate()
            .map(|(i, timestamp)| {
                let date = local_date(*timestamp, offset)
                    .ok_or_else(|| market_error(format!("invalid timestamp {timestamp}")))?;
                Ok((date, closes.get(i).copied().flatten()))
            })
            .collect()
    }
}

fn local_date(timestamp: i64, offset: FixedOffset) -> Option<NaiveDate> {
    DateTime::from_timestamp(timestamp, 0).map(|utc| utc.with_timezone(&offset).date_naive())
}
