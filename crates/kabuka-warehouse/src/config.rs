use crate::error::{Error, Result};
use crate::fetch::FailurePolicy;
use crate::symbols::SymbolMap;
use dotenv::var;
use std::path::PathBuf;
use tracing::debug;

/// User agent sent when `USER_AGENT` is unset; Yahoo refuses bare clients.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Settings read from the environment (and `.env`, once loaded).
///
/// | variable                | default               |
/// |-------------------------|-----------------------|
/// | `USER_AGENT`            | [`DEFAULT_USER_AGENT`]|
/// | `KABUKA_SYMBOLS`        | built-in symbol map   |
/// | `KABUKA_CONCURRENCY`    | number of CPUs        |
/// | `KABUKA_ON_FETCH_ERROR` | `abort`               |
#[derive(Debug, Clone)]
pub struct Config {
    pub user_agent: String,
    pub symbols_path: Option<PathBuf>,
    pub concurrency: usize,
    pub policy: FailurePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let concurrency = match var("KABUKA_CONCURRENCY") {
            Ok(value) => parse_concurrency(&value)?,
            Err(_) => num_cpus::get(),
        };
        let policy = match var("KABUKA_ON_FETCH_ERROR") {
            Ok(value) => value.parse()?,
            Err(_) => FailurePolicy::default(),
        };
        let config = Self {
            user_agent: var("USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
            symbols_path: var("KABUKA_SYMBOLS").ok().map(PathBuf::from),
            concurrency,
            policy,
        };
        debug!("configuration loaded: {config:?}");
        Ok(config)
    }

    /// Override the symbol map file, e.g. from a command line flag.
    pub fn with_symbols_path(mut self, path: Option<PathBuf>) -> Self {
        if path.is_some() {
            self.symbols_path = path;
        }
        self
    }

    /// The configured symbol map, or the built-in one.
    pub fn symbols(&self) -> Result<SymbolMap> {
        match &self.symbols_path {
            Some(path) => SymbolMap::from_file(path),
            None => Ok(SymbolMap::default()),
        }
    }
}

fn parse_concurrency(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(Error::Config(
            "KABUKA_CONCURRENCY must be a positive integer, got 0".to_string(),
        )),
        Ok(n) => Ok(n),
        Err(e) => Err(Error::Config(format!(
            "KABUKA_CONCURRENCY must be a positive integer: {e}"
        ))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            symbols_path: None,
            concurrency: num_cpus::get(),
            policy: FailurePolicy::default(),
        }
    }
}
