use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;

/// Timestamp-like value accepted at the API boundary.
///
/// Clients historically sent class times three ways: an RFC 3339 string, a
/// raw epoch-seconds number, or split date and time fields. This union is the
/// single place those shapes are recognized; everything past the boundary
/// works with a plain `NaiveDateTime` wall-clock value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimestampInput {
    EpochSeconds(i64),
    Text(String),
    Parts {
        date: chrono::NaiveDate,
        time: chrono::NaiveTime,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum InstantError {
    #[error("'{value}' is not an RFC 3339 or YYYY-MM-DDTHH:MM:SS timestamp")]
    UnparseableTimestamp { value: String },
    #[error("epoch seconds {0} is outside the representable range")]
    EpochOutOfRange(i64),
}

impl TimestampInput {
    /// Normalize to a wall-clock `NaiveDateTime`.
    ///
    /// RFC 3339 inputs keep the wall-clock fields as written (the zone a
    /// posting is scheduled in is carried separately); epoch seconds are
    /// read as UTC wall-clock.
    pub fn normalize(&self) -> Result<NaiveDateTime, InstantError> {
        match self {
            TimestampInput::EpochSeconds(seconds) => DateTime::from_timestamp(*seconds, 0)
                .map(|instant| instant.naive_utc())
                .ok_or(InstantError::EpochOutOfRange(*seconds)),
            TimestampInput::Text(raw) => {
                let trimmed = raw.trim();
                if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
                    return Ok(parsed.naive_local());
                }
                NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S").map_err(|_| {
                    InstantError::UnparseableTimestamp {
                        value: raw.clone(),
                    }
                })
            }
            TimestampInput::Parts { date, time } => Ok(date.and_time(*time)),
        }
    }
}
