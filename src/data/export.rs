//! Data Exporter Module
//! Serializes a chart series to CSV text using Polars.

use crate::data::{Aggregation, ChartSeries};
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to build CSV: {0}")]
    Polars(#[from] PolarsError),
    #[error("CSV output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("Failed to write CSV file: {0}")]
    Io(#[from] std::io::Error),
}

/// Column headers of the exported file, in order.
pub const CSV_HEADERS: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// Digits after the decimal point for price columns.
const PRICE_PRECISION: usize = 2;

/// Build a DataFrame with the export columns.
pub fn series_to_dataframe(series: &ChartSeries) -> Result<DataFrame, ExportError> {
    let df = DataFrame::new(vec![
        Column::new(CSV_HEADERS[0].into(), series.dates.clone()),
        Column::new(CSV_HEADERS[1].into(), series.opens.clone()),
        Column::new(CSV_HEADERS[2].into(), series.highs.clone()),
        Column::new(CSV_HEADERS[3].into(), series.lows.clone()),
        Column::new(CSV_HEADERS[4].into(), series.closes.clone()),
        Column::new(CSV_HEADERS[5].into(), series.volumes.clone()),
    ])?;
    Ok(df)
}

/// Render the series as CSV text: header row plus one row per period.
///
/// Fields are quoted only when they contain a separator or quote, which
/// never happens for ISO dates and numbers.
pub fn series_to_csv(series: &ChartSeries) -> Result<String, ExportError> {
    let mut df = series_to_dataframe(series)?;
    let mut buf: Vec<u8> = Vec::new();

    CsvWriter::new(&mut buf)
        .include_header(true)
        .with_float_precision(Some(PRICE_PRECISION))
        .finish(&mut df)?;

    Ok(String::from_utf8(buf)?)
}

/// File name offered in the save dialog.
pub fn export_filename(
    company_name: &str,
    aggregation: Aggregation,
    start_date: &str,
    end_date: &str,
) -> String {
    format!(
        "{}_stock_data_{}_{}_to_{}.csv",
        company_name, aggregation, start_date, end_date
    )
}
