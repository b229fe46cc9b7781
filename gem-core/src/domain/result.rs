//! Trailing-return results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::price::PricePoint;
use crate::error::GemError;

/// A computed trailing return and the window it was measured over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnWindow {
    /// `(last / first - 1) * 100`
    pub percentage_return: f64,
    /// Date of the first price inside the window.
    pub window_start: NaiveDate,
    /// Date of the last price inside the window.
    pub window_end: NaiveDate,
    /// Every price inside the window, ascending.
    pub history: Vec<PricePoint>,
}

/// Outcome of a return computation.
///
/// Serializes as four nullable fields that are either all set or all null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "ReturnFields", try_from = "ReturnFields")]
pub enum ReturnResult {
    Available(ReturnWindow),
    Unavailable,
}

impl ReturnResult {
    /// Fold a fallible computation into a result, logging why it failed.
    ///
    /// This is the single place where fetch and validation failures are
    /// swallowed; calculation errors are never produced on this path.
    pub fn from_outcome(ticker: &str, outcome: Result<ReturnResult, GemError>) -> ReturnResult {
        match outcome {
            Ok(result) => result,
            Err(GemError::Validation(e)) => {
                tracing::error!(ticker, error = %e, "rejected return request");
                ReturnResult::Unavailable
            }
            Err(GemError::Fetch(e)) => {
                tracing::error!(ticker, error = %e, "price fetch failed");
                ReturnResult::Unavailable
            }
            Err(GemError::Calculation(e)) => {
                tracing::error!(ticker, error = %e, "unexpected calculation error");
                ReturnResult::Unavailable
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, ReturnResult::Available(_))
    }

    pub fn window(&self) -> Option<&ReturnWindow> {
        match self {
            ReturnResult::Available(w) => Some(w),
            ReturnResult::Unavailable => None,
        }
    }

    pub fn percentage_return(&self) -> Option<f64> {
        self.window().map(|w| w.percentage_return)
    }

    pub fn window_start(&self) -> Option<NaiveDate> {
        self.window().map(|w| w.window_start)
    }

    pub fn window_end(&self) -> Option<NaiveDate> {
        self.window().map(|w| w.window_end)
    }

    pub fn history(&self) -> Option<&[PricePoint]> {
        self.window().map(|w| w.history.as_slice())
    }
}

/// Wire shape of [`ReturnResult`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ReturnFields {
    percentage_return: Option<f64>,
    window_start: Option<NaiveDate>,
    window_end: Option<NaiveDate>,
    history: Option<Vec<PricePoint>>,
}

impl From<ReturnResult> for ReturnFields {
    fn from(r: ReturnResult) -> Self {
        match r {
            ReturnResult::Available(w) => Self {
                percentage_return: Some(w.percentage_return),
                window_start: Some(w.window_start),
                window_end: Some(w.window_end),
                history: Some(w.history),
            },
            ReturnResult::Unavailable => Self {
                percentage_return: None,
                window_start: None,
                window_end: None,
                history: None,
            },
        }
    }
}

impl TryFrom<ReturnFields> for ReturnResult {
    type Error = String;

    fn try_from(f: ReturnFields) -> Result<Self, Self::Error> {
        match (f.percentage_return, f.window_start, f.window_end, f.history) {
            (Some(percentage_return), Some(window_start), Some(window_end), Some(history)) => {
                Ok(ReturnResult::Available(ReturnWindow {
                    percentage_return,
                    window_start,
                    window_end,
                    history,
                }))
            }
            (None, None, None, None) => Ok(ReturnResult::Unavailable),
            _ => Err("partial return result: fields must be all present or all absent".into()),
        }
    }
}

/// A named instrument's return, as fed to the strategy selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentReturn {
    pub name: String,
    pub result: ReturnResult,
}

impl InstrumentReturn {
    pub fn new(name: impl Into<String>, result: ReturnResult) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }
}
