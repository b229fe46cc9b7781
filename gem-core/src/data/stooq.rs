//! Stooq price provider.
//!
//! Downloads the full daily history for a ticker from Stooq's CSV export
//! endpoint (`/q/d/l/?s={ticker}&i=d`). One request per call, bounded by the
//! client timeout; a timeout is reported like any other transport failure.
//!
//! Stooq rejects some non-browser clients, so requests carry a desktop
//! browser user agent.

use std::time::Duration;

use super::parse::parse_price_csv;
use super::provider::PriceProvider;
use crate::domain::{PriceSeries, Ticker};
use crate::error::FetchFailure;

pub const DEFAULT_BASE_URL: &str = "https://stooq.pl";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/110.0.0.0 Safari/537.36";

/// Stooq CSV provider.
pub struct StooqProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl StooqProvider {
    /// Provider for the public Stooq site with the default 10 s timeout.
    pub fn new() -> reqwest::Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Provider against an arbitrary base URL (mirror, test server).
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Daily-history CSV URL for a ticker.
    pub fn history_url(&self, ticker: &Ticker) -> String {
        format!("{}/q/d/l/?s={}&i=d", self.base_url, ticker)
    }
}

impl PriceProvider for StooqProvider {
    fn name(&self) -> &str {
        "stooq"
    }

    fn fetch(&self, ticker: &Ticker) -> Result<PriceSeries, FetchFailure> {
        let url = self.history_url(ticker);
        tracing::debug!(%ticker, %url, "fetching price history");

        let resp = self.client.get(&url).send()?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchFailure::BadStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text()?;
        let series = parse_price_csv(ticker.as_str(), &body)?;

        tracing::debug!(
            %ticker,
            points = series.len(),
            first = ?series.first_date(),
            last = ?series.last_date(),
            "parsed price history"
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_url_shape() {
        let p = StooqProvider::with_base_url("https://stooq.pl/", DEFAULT_TIMEOUT).unwrap();
        let t = Ticker::parse("iwda.uk").unwrap();
        assert_eq!(p.history_url(&t), "https://stooq.pl/q/d/l/?s=iwda.uk&i=d");
        assert_eq!(p.name(), "stooq");
    }
}
