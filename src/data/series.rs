//! Chart Series Module
//! Index-aligned OHLC + volume columns returned by the backend.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesError {
    #[error("Series column '{column}' has {actual} values, expected {expected}")]
    LengthMismatch {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid OHLC values on {date}: low {low}, open {open}, close {close}, high {high}")]
    InvalidPrices {
        date: String,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
    },
}

/// One trading period, borrowed from a [`ChartSeries`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Period<'a> {
    pub date: &'a str,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Period<'_> {
    /// Close at or above open.
    pub fn is_up(&self) -> bool {
        self.close >= self.open
    }
}

/// Parallel OHLCV columns, one entry per trading period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub dates: Vec<String>,
    pub opens: Vec<f64>,
    pub highs: Vec<f64>,
    pub lows: Vec<f64>,
    pub closes: Vec<f64>,
    pub volumes: Vec<u64>,
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Check column lengths and the low <= open/close <= high ordering.
    pub fn validate(&self) -> Result<(), SeriesError> {
        let expected = self.dates.len();
        let lengths = [
            ("opens", self.opens.len()),
            ("highs", self.highs.len()),
            ("lows", self.lows.len()),
            ("closes", self.closes.len()),
            ("volumes", self.volumes.len()),
        ];
        for (column, actual) in lengths {
            if actual != expected {
                return Err(SeriesError::LengthMismatch {
                    column,
                    expected,
                    actual,
                });
            }
        }

        for p in self.periods() {
            let body_low = p.open.min(p.close);
            let body_high = p.open.max(p.close);
            if !(p.low <= body_low && body_high <= p.high) {
                return Err(SeriesError::InvalidPrices {
                    date: p.date.to_string(),
                    open: p.open,
                    high: p.high,
                    low: p.low,
                    close: p.close,
                });
            }
        }

        Ok(())
    }

    /// Iterate periods in order. Assumes equal column lengths.
    pub fn periods(&self) -> impl Iterator<Item = Period<'_>> + '_ {
        (0..self.len()).map(move |i| Period {
            date: &self.dates[i],
            open: self.opens[i],
            high: self.highs[i],
            low: self.lows[i],
            close: self.closes[i],
            volume: self.volumes[i],
        })
    }

    /// Highest volume in the series, 0 when empty.
    pub fn max_volume(&self) -> u64 {
        self.volumes.iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
pub(crate) fn sample_series() -> ChartSeries {
    ChartSeries {
        dates: vec![
            "2023-01-03".to_string(),
            "2023-01-04".to_string(),
            "2023-01-05".to_string(),
        ],
        opens: vec![130.28, 126.89, 127.13],
        highs: vec![130.9, 128.66, 127.77],
        lows: vec![124.17, 125.08, 124.76],
        closes: vec![125.07, 126.36, 127.13],
        volumes: vec![112_117_500, 89_113_600, 80_962_700],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_series() {
        let series = sample_series();
        assert!(series.validate().is_ok());
        assert_eq!(series.len(), 3);
        assert_eq!(series.max_volume(), 112_117_500);
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let mut series = sample_series();
        series.volumes.pop();
        assert_eq!(
            series.validate(),
            Err(SeriesError::LengthMismatch {
                column: "volumes",
                expected: 3,
                actual: 2,
            })
        );
    }

    #[test]
    fn test_inverted_high_low_rejected() {
        let mut series = sample_series();
        series.highs[1] = 120.0;
        match series.validate() {
            Err(SeriesError::InvalidPrices { date, .. }) => assert_eq!(date, "2023-01-04"),
            other => panic!("expected InvalidPrices, got {:?}", other),
        }
    }

    #[test]
    fn test_period_direction() {
        let series = sample_series();
        let up: Vec<bool> = series.periods().map(|p| p.is_up()).collect();
        // Third period closes flat, which counts as up.
        assert_eq!(up, vec![false, false, true]);
    }

    #[test]
    fn test_negative_volume_fails_to_deserialize() {
        let json = r#"{"dates":["2023-01-03"],"opens":[1.0],"highs":[2.0],"lows":[0.5],"closes":[1.5],"volumes":[-5]}"#;
        assert!(serde_json::from_str::<ChartSeries>(json).is_err());
    }
}
