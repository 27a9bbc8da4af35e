use crate::api::ClosingSeries;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// Canonical human-readable column label, e.g. `02 January 2024`.
pub const DATE_FORMAT: &str = "%d %B %Y";

/// Symbol left out of a table under the skip-and-warn policy.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub name: String,
    pub ticker: String,
    pub reason: String,
}

/// Closing prices with one row per company and one column per trading date.
///
/// Columns are the sorted union of every row's dates; a row without a close
/// on some date holds `None` there.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct PriceTable {
    dates: Vec<NaiveDate>,
    rows: Vec<PriceRow>,
    skipped: Vec<SkippedSymbol>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub name: String,
    pub cells: Vec<Option<f64>>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `series` as the row labelled `name`, widening the column set
    /// with any dates not seen before.
    pub fn push_row(&mut self, name: impl Into<String>, series: &ClosingSeries) {
        let columns: BTreeSet<NaiveDate> = self
            .dates
            .iter()
            .copied()
            .chain(series.iter().map(|(date, _)| *date))
            .collect();

        if columns.len() != self.dates.len() {
            let widened: Vec<NaiveDate> = columns.into_iter().collect();
            for row in &mut self.rows {
                let old: BTreeMap<NaiveDate, Option<f64>> =
                    self.dates.iter().copied().zip(row.cells.iter().copied()).collect();
                row.cells = widened
                    .iter()
                    .map(|date| old.get(date).copied().flatten())
                    .collect();
            }
            self.dates = widened;
        }

        let closes: BTreeMap<NaiveDate, Option<f64>> = series.iter().copied().collect();
        let cells = self
            .dates
            .iter()
            .map(|date| closes.get(date).copied().flatten())
            .collect();
        self.rows.push(PriceRow {
            name: name.into(),
            cells,
        });
    }

    pub fn record_skipped(&mut self, skipped: SkippedSymbol) {
        self.skipped.push(skipped);
    }

    /// Row labels, in row order.
    pub fn companies(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.name.as_str()).collect()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Column labels in [`DATE_FORMAT`].
    pub fn date_labels(&self) -> Vec<String> {
        self.dates
            .iter()
            .map(|date| date.format(DATE_FORMAT).to_string())
            .collect()
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn row(&self, name: &str) -> Option<&PriceRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn skipped(&self) -> &[SkippedSymbol] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Restrict the table to `names`, in selection order. Repeated names
    /// collapse to their first occurrence.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<PriceTable> {
        let mut rows: Vec<PriceRow> = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            if rows.iter().any(|row| row.name == name) {
                continue;
            }
            let row = self
                .row(name)
                .ok_or_else(|| Error::UnknownCompany(name.to_string()))?;
            rows.push(row.clone());
        }
        Ok(PriceTable {
            dates: self.dates.clone(),
            rows,
            skipped: Vec::new(),
        })
    }

    /// Date-indexed view with one column per company.
    pub fn transpose(&self) -> DateFrame {
        let rows = self
            .dates
            .iter()
            .enumerate()
            .map(|(i, date)| (*date, self.rows.iter().map(|row| row.cells[i]).collect()))
            .collect();
        DateFrame {
            companies: self.rows.iter().map(|row| row.name.clone()).collect(),
            rows,
        }
    }
}

/// A [`PriceTable`] turned on its side: one row per date.
#[derive(Debug, Clone, PartialEq)]
pub struct DateFrame {
    pub companies: Vec<String>,
    pub rows: Vec<(NaiveDate, Vec<Option<f64>>)>,
}

/// One point of the long-form table handed to the chart.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PriceRecord {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Stock Prices")]
    pub price: Option<f64>,
}

impl DateFrame {
    /// Unpivot into `(date, name, price)` records, company by company.
    pub fn melt(&self) -> Vec<PriceRecord> {
        self.companies
            .iter()
            .enumerate()
            .flat_map(|(j, name)| {
                self.rows.iter().map(move |(date, prices)| PriceRecord {
                    date: *date,
                    name: name.clone(),
                    price: prices[j],
                })
            })
            .collect()
    }
}
