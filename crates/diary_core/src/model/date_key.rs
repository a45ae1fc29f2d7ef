//! Calendar date key (`YYYY-MM-DD`).
//!
//! # Responsibility
//! - Parse and validate the canonical bucket key used across the store.
//! - Bridge between string keys and `chrono::NaiveDate`.
//!
//! # Invariants
//! - A `DateKey` always holds a zero-padded, real calendar date.
//! - Ordering of keys equals string ordering, which equals date ordering.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";
const DATE_KEY_LEN: usize = 10;

/// Error returned when a string is not a valid date key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateKeyError {
    /// Input does not have the `YYYY-MM-DD` shape.
    Malformed(String),
    /// Shape is right but the date does not exist (e.g. `2023-02-30`).
    OutOfRange(String),
}

impl Display for DateKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "date key must be YYYY-MM-DD, got `{value}`"),
            Self::OutOfRange(value) => write!(f, "date key `{value}` is not a calendar date"),
        }
    }
}

impl Error for DateKeyError {}

/// Validated `YYYY-MM-DD` bucket key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(String);

impl DateKey {
    /// Parses and validates a date key.
    ///
    /// # Errors
    /// - `Malformed` when the shape is not exactly `YYYY-MM-DD`.
    /// - `OutOfRange` when the date does not exist.
    pub fn parse(value: &str) -> Result<Self, DateKeyError> {
        let trimmed = value.trim();
        if !has_date_key_shape(trimmed) {
            return Err(DateKeyError::Malformed(trimmed.to_string()));
        }
        NaiveDate::parse_from_str(trimmed, DATE_KEY_FORMAT)
            .map_err(|_| DateKeyError::OutOfRange(trimmed.to_string()))?;
        Ok(Self(trimmed.to_string()))
    }

    /// Builds a key from a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DATE_KEY_FORMAT).to_string())
    }

    /// Key for the current local day.
    pub fn today() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the calendar date behind this key.
    pub fn to_date(&self) -> NaiveDate {
        // Shape and range were checked at construction.
        NaiveDate::parse_from_str(&self.0, DATE_KEY_FORMAT).unwrap_or(NaiveDate::MIN)
    }
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DateKey {
    type Err = DateKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DateKey {
    type Error = DateKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(value: DateKey) -> Self {
        value.0
    }
}

impl From<NaiveDate> for DateKey {
    fn from(value: NaiveDate) -> Self {
        Self::from_date(value)
    }
}

fn has_date_key_shape(value: &str) -> bool {
    value.len() == DATE_KEY_LEN
        && value.bytes().enumerate().all(|(idx, byte)| match idx {
            4 | 7 => byte == b'-',
            _ => byte.is_ascii_digit(),
        })
}

#[cfg(test)]
mod tests {
    use super::{DateKey, DateKeyError};
    use chrono::NaiveDate;

    #[test]
    fn parse_accepts_zero_padded_calendar_dates() {
        let key = DateKey::parse("2024-02-29").expect("leap day should parse");
        assert_eq!(key.as_str(), "2024-02-29");
        assert_eq!(key.to_date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn parse_rejects_unpadded_and_impossible_dates() {
        assert!(matches!(
            DateKey::parse("2024-1-01"),
            Err(DateKeyError::Malformed(_))
        ));
        assert!(matches!(
            DateKey::parse("2023-02-29"),
            Err(DateKeyError::OutOfRange(_))
        ));
        assert!(matches!(
            DateKey::parse("2024/01/01"),
            Err(DateKeyError::Malformed(_))
        ));
    }

    #[test]
    fn ordering_follows_calendar_order() {
        let earlier = DateKey::parse("2023-12-31").unwrap();
        let later = DateKey::parse("2024-01-01").unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn serde_rejects_invalid_keys() {
        let ok: DateKey = serde_json::from_str("\"2024-05-01\"").unwrap();
        assert_eq!(ok.as_str(), "2024-05-01");
        assert!(serde_json::from_str::<DateKey>("\"yesterday\"").is_err());
    }
}
