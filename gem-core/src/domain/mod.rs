//! Domain types for the GEM recommender

pub mod instrument;
pub mod price;
pub mod result;
pub mod ticker;

pub use instrument::{AssetClass, Instrument, Universe};
pub use price::{PricePoint, PriceSeries};
pub use result::{InstrumentReturn, ReturnResult, ReturnWindow};
pub use ticker::{parse_reference_date, Ticker, DATE_FORMAT};
