use crate::types::errors::TimestampError;
use chrono::{NaiveDate, NaiveDateTime};

//NOTE: The cleaned extracts are written in ISO form while the raw export keeps the US style `12/1/2010 8:26`
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S"
];

/// Parses an invoice timestamp in any of the layouts found in the extracts.
///
/// A bare `YYYY-MM-DD` date is accepted and read as midnight.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, TimestampError> {
    let value = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(timestamp);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TimestampError::UnrecognisedFormat(value.to_string()))
}
