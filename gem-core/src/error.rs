//! Error taxonomy shared by the fetch, cache and selection layers.
//!
//! - [`FetchFailure`]: anything that went wrong getting a price series.
//! - [`ValidationFailure`]: a ticker or reference date rejected before I/O.
//! - [`CalculationError`]: a contract violation in the selection logic.
//!
//! Fetch and validation failures never leave the cache layer as errors; they
//! are folded into [`crate::domain::ReturnResult::Unavailable`] by
//! [`crate::domain::ReturnResult::from_outcome`]. Only calculation errors
//! reach the caller.

use thiserror::Error;

/// Why a price series could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("network error: {0}")]
    Network(String),

    #[error("quote source returned HTTP {status}")]
    BadStatus { status: u16 },

    #[error("response is not parseable price data: {0}")]
    Unparseable(String),

    #[error("response has no {missing} column (found: {found:?})")]
    MissingColumns {
        missing: &'static str,
        found: Vec<String>,
    },

    #[error("quote source returned no price rows")]
    Empty,
}

impl From<reqwest::Error> for FetchFailure {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return FetchFailure::BadStatus {
                status: status.as_u16(),
            };
        }
        if e.is_decode() || e.is_body() {
            return FetchFailure::Unparseable(e.to_string());
        }
        // connect, timeout, request building and redirect loops all count as transport
        FetchFailure::Network(e.to_string())
    }
}

impl From<csv::Error> for FetchFailure {
    fn from(e: csv::Error) -> Self {
        FetchFailure::Unparseable(e.to_string())
    }
}

/// Input rejected before any network call or computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    #[error("invalid ticker '{0}': expected letters, digits and dots only")]
    Ticker(String),

    #[error("invalid reference date '{0}': expected YYYY-MM-DD")]
    Date(String),
}

/// Contract violation in the strategy selector.
///
/// Missing data is a valid outcome, never one of these.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("instrument '{0}' is listed as both equity and bond")]
    OverlappingSets(String),

    #[error("instrument '{0}' appears more than once in the return set")]
    DuplicateInstrument(String),

    #[error("instrument '{name}' has a non-finite return ({value})")]
    NonFiniteReturn { name: String, value: f64 },
}

/// Union of the three failure kinds.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GemError {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error(transparent)]
    Validation(#[from] ValidationFailure),

    #[error(transparent)]
    Calculation(#[from] CalculationError),
}
