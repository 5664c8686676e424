//! API module - backend chart-data endpoint

mod client;
mod types;

pub use client::{ChartDataClient, ChartDataSource, FetchError};
pub use types::{ChartDataResponse, ChartRequest, ErrorResponse};
