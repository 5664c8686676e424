//! Wire types for the chart-data endpoint.

use crate::data::{Aggregation, ChartSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chart-data/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRequest {
    pub company_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub aggregation: Aggregation,
}

/// Successful response payload.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChartDataResponse {
    pub chart_data: ChartSeries,
    pub company_name: String,
    pub start_date: String,
    pub end_date: String,
    pub aggregation: Aggregation,
    pub data_points: usize,
}

/// Error payload sent with non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}
