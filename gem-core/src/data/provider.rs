//! Price provider trait.
//!
//! The PriceProvider trait abstracts over quote sources so the return cache can
//! be driven by Stooq in production and by in-memory fakes in tests.

use crate::domain::{PriceSeries, Ticker};
use crate::error::FetchFailure;

/// A source of daily closing prices.
///
/// Implementations perform exactly one attempt per call: no retries, no
/// caching. The cache layer sits above this trait.
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the full daily history for a ticker, ascending by date.
    fn fetch(&self, ticker: &Ticker) -> Result<PriceSeries, FetchFailure>;
}
