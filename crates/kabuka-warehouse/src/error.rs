use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown company: {0}")]
    UnknownCompany(String),

    #[error("duplicate company in symbol map: {0}")]
    DuplicateCompany(String),

    /// Names travel as comma separated lists, so they may not contain one.
    #[error("company name may not contain a comma: {0}")]
    InvalidCompanyName(String),

    #[error("invalid price range: min {min} must be finite and no greater than max {max}")]
    InvalidPriceRange { min: f64, max: f64 },

    /// A single symbol failed while assembling a price table.
    #[error("failed to fetch prices for [{ticker}] {name}: {source}")]
    Fetch {
        name: String,
        ticker: String,
        #[source]
        source: Box<Error>,
    },

    #[error("market data error for [{ticker}]: {message}")]
    MarketData { ticker: String, message: String },

    #[error("market data request for [{ticker}] returned status {status}")]
    Status {
        ticker: String,
        status: reqwest::StatusCode,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}
