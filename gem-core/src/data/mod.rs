//! Price-history ingestion: provider trait, Stooq client, CSV parsing

pub mod parse;
pub mod provider;
pub mod stooq;

pub use parse::parse_price_csv;
pub use provider::PriceProvider;
pub use stooq::StooqProvider;
