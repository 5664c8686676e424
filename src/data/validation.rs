//! Input Validator Module
//! Checks the company/date selection before a request is issued.

use crate::api::ChartRequest;
use crate::data::aggregation_level;
use chrono::NaiveDate;
use thiserror::Error;

/// Date format used by the date fields and on the wire.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please select a company")]
    MissingCompany,
    #[error("Please select both start and end dates")]
    MissingDates,
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Parse a date field value.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// Validate the form and build the request to send.
pub fn validate_inputs(
    company_id: &str,
    start: &str,
    end: &str,
) -> Result<ChartRequest, ValidationError> {
    if company_id.trim().is_empty() {
        return Err(ValidationError::MissingCompany);
    }

    if start.trim().is_empty() || end.trim().is_empty() {
        return Err(ValidationError::MissingDates);
    }

    let start_date = parse_date(start).ok_or_else(|| ValidationError::InvalidDate(start.to_string()))?;
    let end_date = parse_date(end).ok_or_else(|| ValidationError::InvalidDate(end.to_string()))?;

    Ok(ChartRequest {
        company_id: company_id.trim().to_string(),
        start_date,
        end_date,
        aggregation: aggregation_level(start_date, end_date),
    })
}

/// Force `end` up to `start` when the range is inverted.
///
/// Returns true if `end` was changed. Fields that do not hold a valid date
/// are left untouched.
pub fn correct_date_range(start: &str, end: &mut String) -> bool {
    match (parse_date(start), parse_date(end)) {
        (Some(s), Some(e)) if s > e => {
            *end = start.trim().to_string();
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Aggregation;

    #[test]
    fn test_missing_company() {
        let err = validate_inputs("", "2023-01-01", "2023-01-10").unwrap_err();
        assert_eq!(err, ValidationError::MissingCompany);
        assert_eq!(err.to_string(), "Please select a company");
    }

    #[test]
    fn test_missing_dates() {
        assert_eq!(
            validate_inputs("1", "", "2023-01-10").unwrap_err(),
            ValidationError::MissingDates
        );
        assert_eq!(
            validate_inputs("1", "2023-01-01", "  ").unwrap_err(),
            ValidationError::MissingDates
        );
    }

    #[test]
    fn test_malformed_date() {
        let err = validate_inputs("1", "01/02/2023", "2023-01-10").unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("01/02/2023".to_string()));
    }

    #[test]
    fn test_valid_request_carries_aggregation() {
        let request = validate_inputs("7", "2023-01-01", "2023-01-10").unwrap();
        assert_eq!(request.company_id, "7");
        assert_eq!(request.aggregation, Aggregation::Daily);
        assert_eq!(request.end_date, NaiveDate::from_ymd_opt(2023, 1, 10).unwrap());
    }

    #[test]
    fn test_inverted_range_forces_end_to_start() {
        let pairs = [
            ("2023-05-01", "2023-04-30"),
            ("2024-01-01", "2015-06-15"),
            ("2023-12-31", "2023-01-01"),
        ];
        for (start, end) in pairs {
            let mut end = end.to_string();
            assert!(correct_date_range(start, &mut end));
            assert_eq!(end, start);
        }
    }

    #[test]
    fn test_ordered_or_unparseable_range_is_untouched() {
        let mut end = "2023-01-10".to_string();
        assert!(!correct_date_range("2023-01-01", &mut end));
        assert_eq!(end, "2023-01-10");

        let mut end = "2023-01-01".to_string();
        assert!(!correct_date_range("", &mut end));
        assert_eq!(end, "2023-01-01");
    }
}
