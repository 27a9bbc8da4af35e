use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse lookback window accepted by the market data source in place of an
/// exact day count.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Period {
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    /// Every bucket, smallest first.
    pub const ALL: [Period; 9] = [
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::Max,
    ];

    /// The `range` token sent to the market data source.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::Max => "max",
        }
    }

    /// Largest day count that still resolves to this bucket; `None` for
    /// [`Period::Max`], which is unbounded.
    pub fn days(&self) -> Option<i64> {
        match self {
            Period::FiveDays => Some(5),
            Period::OneMonth => Some(30),
            Period::ThreeMonths => Some(90),
            Period::SixMonths => Some(180),
            Period::OneYear => Some(365),
            Period::TwoYears => Some(730),
            Period::FiveYears => Some(1825),
            Period::TenYears => Some(3650),
            Period::Max => None,
        }
    }
}

/// Smallest bucket whose day-equivalent covers `days`.
///
/// Total over `i64`: zero and negative counts resolve to [`Period::FiveDays`]
/// and anything past ten years resolves to [`Period::Max`].
pub fn select_period(days: i64) -> Period {
    Period::ALL
        .into_iter()
        .find(|period| period.days().map_or(true, |limit| days <= limit))
        .unwrap_or(Period::Max)
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|period| period.as_str() == s)
            .ok_or_else(|| format!("unrecognised period: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_follow_thresholds() {
        let cases = [
            (1..=5, Period::FiveDays),
            (6..=30, Period::OneMonth),
            (31..=90, Period::ThreeMonths),
            (91..=180, Period::SixMonths),
            (181..=365, Period::OneYear),
            (366..=730, Period::TwoYears),
            (731..=1825, Period::FiveYears),
            (1826..=3650, Period::TenYears),
        ];
        for (range, expected) in cases {
            for days in range {
                assert_eq!(select_period(days), expected, "days = {days}");
            }
        }
    }

    #[test]
    fn past_ten_years_is_max() {
        assert_eq!(select_period(3651), Period::Max);
        assert_eq!(select_period(100_000), Period::Max);
        assert_eq!(select_period(i64::MAX), Period::Max);
    }

    #[test]
    fn non_positive_days_resolve_to_smallest_bucket() {
        assert_eq!(select_period(0), Period::FiveDays);
        assert_eq!(select_period(-1), Period::FiveDays);
        assert_eq!(select_period(i64::MIN), Period::FiveDays);
    }

    #[test]
    fn wire_tokens() {
        assert_eq!(Period::OneMonth.to_string(), "1mo");
        assert_eq!("10y".parse::<Period>(), Ok(Period::TenYears));
        assert!("2w".parse::<Period>().is_err());
        assert_eq!(serde_json::to_string(&Period::Max).unwrap(), "\"max\"");
    }
}
