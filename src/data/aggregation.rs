//! Aggregation Selector Module
//! Chooses the bucketing granularity requested from the backend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Spans longer than this many days are requested monthly.
pub const MONTHLY_THRESHOLD_DAYS: i64 = 365;
/// Spans longer than this many days (up to the monthly threshold) are requested weekly.
pub const WEEKLY_THRESHOLD_DAYS: i64 = 60;

/// Granularity at which the backend buckets raw OHLC rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Aggregation {
    /// Wire value, as sent in the request body and used in export filenames.
    pub fn as_str(self) -> &'static str {
        match self {
            Aggregation::Daily => "daily",
            Aggregation::Weekly => "weekly",
            Aggregation::Monthly => "monthly",
        }
    }

    /// Title-case label used in chart titles.
    pub fn label(self) -> &'static str {
        match self {
            Aggregation::Daily => "Daily",
            Aggregation::Weekly => "Weekly",
            Aggregation::Monthly => "Monthly",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick the aggregation level for a date range.
///
/// Dates carry no time component, so the whole-day span is exact and
/// needs no rounding.
pub fn aggregation_level(start: NaiveDate, end: NaiveDate) -> Aggregation {
    let span = (end - start).num_days();

    if span > MONTHLY_THRESHOLD_DAYS {
        Aggregation::Monthly
    } else if span > WEEKLY_THRESHOLD_DAYS {
        Aggregation::Weekly
    } else {
        Aggregation::Daily
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn span(days: i64) -> Aggregation {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        aggregation_level(start, start + Duration::days(days))
    }

    #[test]
    fn test_thresholds_are_boundary_exact() {
        assert_eq!(span(30), Aggregation::Daily);
        assert_eq!(span(60), Aggregation::Daily);
        assert_eq!(span(61), Aggregation::Weekly);
        assert_eq!(span(365), Aggregation::Weekly);
        assert_eq!(span(366), Aggregation::Monthly);
    }

    #[test]
    fn test_same_day_and_reversed_range_are_daily() {
        assert_eq!(span(0), Aggregation::Daily);
        assert_eq!(span(-400), Aggregation::Daily);
    }

    #[test]
    fn test_wire_format() {
        assert_eq!(serde_json::to_string(&Aggregation::Weekly).unwrap(), "\"weekly\"");
        let parsed: Aggregation = serde_json::from_str("\"monthly\"").unwrap();
        assert_eq!(parsed, Aggregation::Monthly);
        assert_eq!(Aggregation::Daily.label(), "Daily");
    }
}
