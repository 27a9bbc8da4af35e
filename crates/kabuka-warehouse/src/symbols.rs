use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// Companies charted when no symbol map file is configured.
pub const DEFAULT_SYMBOLS: [(&str, &str); 8] = [
    ("apple", "AAPL"),
    ("facebook", "META"),
    ("google", "GOOGL"),
    ("microsoft", "MSFT"),
    ("netflix", "NFLX"),
    ("amazon", "AMZN"),
    ("TOTO", "5332.T"),
    ("TOYOTA", "7203.T"),
];

/// Insertion-ordered mapping of display name to ticker symbol.
///
/// Names are unique. The map is built once at start-up and never mutated,
/// so it is safe to use as part of a cache key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolMap(Vec<(String, String)>);

impl SymbolMap {
    pub fn new<I, N, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for (name, ticker) in pairs {
            let name = name.into();
            if name.contains(',') {
                return Err(Error::InvalidCompanyName(name));
            }
            if !seen.insert(name.clone()) {
                return Err(Error::DuplicateCompany(name));
            }
            entries.push((name, ticker.into()));
        }
        Ok(Self(entries))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Read a map from a JSON file holding either `[["name", "TICKER"], ...]`
    /// or `{"name": "TICKER", ...}`. Object keys keep their file order.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let map = Self::from_json(&bytes)?;
        debug!("loaded {} symbols from {}", map.len(), path.display());
        Ok(map)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        match serde_json::from_slice::<SymbolFile>(bytes)? {
            SymbolFile::Pairs(pairs) => Self::new(pairs),
            SymbolFile::Object(object) => Self::new(
                object
                    .into_iter()
                    .map(|(name, ticker)| match ticker {
                        serde_json::Value::String(ticker) => Ok((name, ticker)),
                        other => Err(Error::Config(format!(
                            "ticker for {name} must be a string, found {other}"
                        ))),
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, ticker)| (name.as_str(), ticker.as_str()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn ticker(&self, name: &str) -> Option<&str> {
        self.iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, ticker)| ticker)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for SymbolMap {
    fn default() -> Self {
        Self(
            DEFAULT_SYMBOLS
                .iter()
                .map(|(name, ticker)| (name.to_string(), ticker.to_string()))
                .collect(),
        )
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SymbolFile {
    Pairs(Vec<(String, String)>),
    Object(serde_json::Map<String, serde_json::Value>),
}
