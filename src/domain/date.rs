//! Transaction dates.

use crate::error::AppError;
use chrono::{Datelike, NaiveDate};

/// Dates are stored as `YYYY-MM-DD` text and ordered as text, which only
/// sorts chronologically for four-digit, non-negative years.
pub fn validate_date(date: NaiveDate) -> Result<NaiveDate, AppError> {
    if !(0..=9999).contains(&date.year()) {
        return Err(AppError::InvalidInput(format!(
            "transaction_date {} is outside 0000-01-01..=9999-12-31",
            date
        )));
    }
    Ok(date)
}
