//! GEM Core: price fetching, trailing returns, the return cache and GEM selection.
//!
//! This crate contains the decision machinery of the recommender:
//! - Domain types (tickers, price series, return results, instruments)
//! - Stooq price provider behind the `PriceProvider` trait
//! - 12-month trailing-return window that skips the latest month
//! - Bounded, TTL-reset return cache with per-key single flight
//! - The GEM rule: best equity if positive, otherwise best bond

pub mod cache;
pub mod clock;
pub mod data;
pub mod domain;
pub mod error;
pub mod returns;
pub mod strategy;

pub use cache::{CacheConfig, CacheStats, ReturnCache};
pub use clock::{Clock, ManualClock, SystemClock};
pub use data::{parse_price_csv, PriceProvider, StooqProvider};
pub use domain::{
    AssetClass, Instrument, InstrumentReturn, PricePoint, PriceSeries, ReturnResult,
    ReturnWindow, Ticker, Universe,
};
pub use error::{CalculationError, FetchFailure, GemError, ValidationFailure};
pub use returns::{compute_return, safe_divide, TrailingWindow};
pub use strategy::{select_gem, Recommendation};
