use crate::error::{Error, Result};
use crate::table::PriceRecord;
use serde::Serialize;
use serde_json::{json, Value};

/// Vega-Lite schema the chart specification targets.
pub const VEGA_LITE_SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Display-only bounds of the price axis. Never filters the data itself.
#[derive(Serialize, Copy, Clone, Debug, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Lowest floor the range controls offer.
    pub const FLOOR: f64 = 0.0;
    /// Highest ceiling the range controls offer.
    pub const CEILING: f64 = 5000.0;

    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(Error::InvalidPriceRange { min, max });
        }
        Ok(Self { min, max })
    }

    /// Slider semantics: reversed bounds swap, everything lands inside
    /// [`FLOOR`](Self::FLOOR)..=[`CEILING`](Self::CEILING) and non-finite
    /// bounds fall back to the nearest edge.
    pub fn clamped(min: f64, max: f64) -> Self {
        let clamp = |value: f64, fallback: f64| {
            if value.is_nan() {
                fallback
            } else {
                value.clamp(Self::FLOOR, Self::CEILING)
            }
        };
        let (min, max) = (clamp(min, Self::FLOOR), clamp(max, Self::CEILING));
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Self::FLOOR,
            max: Self::CEILING,
        }
    }
}

/// Everything the chart collaborator needs to draw one line per company.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub records: Vec<PriceRecord>,
    pub range: PriceRange,
}

impl ChartSpec {
    pub fn new(records: Vec<PriceRecord>, range: PriceRange) -> Self {
        Self { records, range }
    }

    /// Company names with at least one record, in first-seen order. Each is
    /// drawn as its own coloured line.
    pub fn series(&self) -> Vec<&str> {
        let mut series: Vec<&str> = Vec::new();
        for record in &self.records {
            if !series.contains(&record.name.as_str()) {
                series.push(&record.name);
            }
        }
        series
    }

    /// Time series line chart: date on x, price on y clipped to the range,
    /// colour by company.
    pub fn to_vega_lite(&self) -> Value {
        json!({
            "$schema": VEGA_LITE_SCHEMA,
            "width": "container",
            "data": { "values": self.records },
            "mark": { "type": "line", "opacity": 0.8, "clip": true },
            "encoding": {
                "x": { "field": "Date", "type": "temporal" },
                "y": {
                    "field": "Stock Prices",
                    "type": "quantitative",
                    "stack": null,
                    "scale": { "domain": [self.range.min, self.range.max] }
                },
                "color": { "field": "Name", "type": "nominal" }
            }
        })
    }
}
