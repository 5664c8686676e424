//! Data module - series model, input validation, aggregation and CSV export

mod aggregation;
mod export;
pub(crate) mod series;
mod validation;

pub use aggregation::{aggregation_level, Aggregation};
pub use export::{export_filename, series_to_csv, ExportError};
pub use series::{ChartSeries, SeriesError};
pub use validation::{correct_date_range, validate_inputs};
