// Strict date-only parsing (YYYY-MM-DD)
//
// chrono's `%m`/`%d` accept unpadded fields, so the shape is checked first.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use super::error::RequestError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date into midnight UTC of that day
pub fn parse_day_start(value: &str) -> Result<DateTime<Utc>, RequestError> {
    if !has_date_shape(value) {
        return Err(RequestError::DateFormat(value.to_string()));
    }

    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
        .map_err(|_| RequestError::DateFormat(value.to_string()))
}

/// Four-digit year, two-digit month and day, `-` separators
fn has_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}
