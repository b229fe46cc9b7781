use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationFailure;

/// Date format accepted for reference dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Quote-source ticker symbol (e.g. `iwda.uk`).
///
/// Only letters, digits and dots are allowed, so a ticker can be spliced into
/// the source URL without escaping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    pub fn parse(raw: &str) -> Result<Self, ValidationFailure> {
        if !raw.is_empty() && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '.') {
            Ok(Self(raw.to_string()))
        } else {
            Err(ValidationFailure::Ticker(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationFailure;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Ticker::parse(&value)
    }
}

impl From<Ticker> for String {
    fn from(t: Ticker) -> Self {
        t.0
    }
}

/// Parse a `YYYY-MM-DD` reference date.
pub fn parse_reference_date(raw: &str) -> Result<NaiveDate, ValidationFailure> {
    // chrono skips whitespace before numeric fields; padded input is rejected
    if raw.chars().any(char::is_whitespace) {
        return Err(ValidationFailure::Date(raw.to_string()));
    }
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| ValidationFailure::Date(raw.to_string()))
}
