//! Recommendation service: one request in, one GEM report out.
//!
//! For a reference date the service asks the return cache for every
//! instrument in the universe plus the benchmark, then runs the GEM rule on
//! the universe returns. Instruments without data stay in the report as
//! unavailable and never abort the batch.

use std::sync::Arc;

use chrono::NaiveDate;
use gem_core::cache::ReturnCache;
use gem_core::data::{PriceProvider, StooqProvider};
use gem_core::domain::{parse_reference_date, InstrumentReturn, ReturnResult, Ticker, Universe};
use gem_core::error::{CalculationError, ValidationFailure};
use gem_core::strategy::{select_gem, Recommendation};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, GemConfig};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("strategy contract violated: {0}")]
    Calculation(#[from] CalculationError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot construct price provider: {0}")]
    Provider(String),
}

/// Reference index shown next to the universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Benchmark {
    pub name: String,
    pub symbol: Ticker,
}

/// Benchmark name, symbol and its trailing return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReturn {
    pub name: String,
    pub symbol: Ticker,
    pub result: ReturnResult,
}

/// Everything computed for one reference date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationReport {
    pub reference_date: NaiveDate,
    /// Per-instrument results, in universe order.
    pub returns: Vec<InstrumentReturn>,
    pub benchmark: BenchmarkReturn,
    pub recommendation: Recommendation,
}

pub struct RecommendationService {
    cache: ReturnCache,
    universe: Universe,
    benchmark: Benchmark,
    parallel_fetch: bool,
}

impl RecommendationService {
    pub fn new(cache: ReturnCache, universe: Universe, benchmark: Benchmark) -> Self {
        Self {
            cache,
            universe,
            benchmark,
            parallel_fetch: true,
        }
    }

    /// Fetch instruments one by one instead of on the rayon pool.
    pub fn with_parallel_fetch(mut self, enabled: bool) -> Self {
        self.parallel_fetch = enabled;
        self
    }

    /// Service backed by Stooq, wired from a validated config.
    pub fn from_config(config: &GemConfig) -> Result<Self, ServiceError> {
        let provider = StooqProvider::with_base_url(&config.data.base_url, config.fetch_timeout())
            .map_err(|e| ServiceError::Provider(e.to_string()))?;
        Self::with_provider(config, Arc::new(provider))
    }

    /// Service over an arbitrary provider, wired from a validated config.
    pub fn with_provider(
        config: &GemConfig,
        provider: Arc<dyn PriceProvider>,
    ) -> Result<Self, ServiceError> {
        let universe = config.universe()?;
        let benchmark = Benchmark {
            name: config.benchmark.name.clone(),
            symbol: config.benchmark_ticker()?,
        };
        let cache = ReturnCache::new(provider, config.cache_config());
        Ok(Self::new(cache, universe, benchmark).with_parallel_fetch(config.data.parallel_fetch))
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn benchmark(&self) -> &Benchmark {
        &self.benchmark
    }

    pub fn cache(&self) -> &ReturnCache {
        &self.cache
    }

    /// Trailing return of a single ticker through the cache.
    pub fn instrument_return(&self, ticker: &str, reference_date: &str) -> ReturnResult {
        self.cache.get_return(ticker, reference_date)
    }

    /// Compute the GEM recommendation for `reference_date` (`YYYY-MM-DD`).
    ///
    /// An unparseable date is rejected before any fetch. Missing data for
    /// individual instruments is reported, not raised.
    pub fn compute_recommendation(
        &self,
        reference_date: &str,
    ) -> Result<RecommendationReport, ServiceError> {
        let date = parse_reference_date(reference_date)?;
        tracing::info!(%date, instruments = self.universe.len(), "computing recommendation");

        let fetch = |name: &str, symbol: &Ticker| {
            InstrumentReturn::new(name, self.cache.get_return(symbol.as_str(), reference_date))
        };

        let (returns, benchmark_result) = if self.parallel_fetch {
            rayon::join(
                || {
                    self.universe
                        .instruments()
                        .par_iter()
                        .map(|i| fetch(&i.name, &i.symbol))
                        .collect::<Vec<_>>()
                },
                || self.cache.get_return(self.benchmark.symbol.as_str(), reference_date),
            )
        } else {
            let returns = self
                .universe
                .instruments()
                .iter()
                .map(|i| fetch(&i.name, &i.symbol))
                .collect::<Vec<_>>();
            let benchmark = self
                .cache
                .get_return(self.benchmark.symbol.as_str(), reference_date);
            (returns, benchmark)
        };

        let missing: Vec<&str> = returns
            .iter()
            .filter(|r| !r.result.is_available())
            .map(|r| r.name.as_str())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(?missing, "instruments without return data");
        }

        let recommendation = select_gem(
            &returns,
            &self.universe.equity_names(),
            &self.universe.bond_names(),
        )?;
        tracing::info!(%date, %recommendation, "recommendation ready");

        Ok(RecommendationReport {
            reference_date: date,
            returns,
            benchmark: BenchmarkReturn {
                name: self.benchmark.name.clone(),
                symbol: self.benchmark.symbol.clone(),
                result: benchmark_result,
            },
            recommendation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gem_core::domain::{PricePoint, PriceSeries};
    use gem_core::error::FetchFailure;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoNetwork {
        calls: AtomicUsize,
    }

    impl PriceProvider for NoNetwork {
        fn name(&self) -> &str {
            "none"
        }

        fn fetch(&self, _ticker: &Ticker) -> Result<PriceSeries, FetchFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(FetchFailure::Network("offline".into()))
        }
    }

    fn service(provider: Arc<NoNetwork>) -> RecommendationService {
        RecommendationService::with_provider(&GemConfig::default(), provider).unwrap()
    }

    #[test]
    fn invalid_date_is_rejected_before_fetching() {
        let provider = Arc::new(NoNetwork {
            calls: AtomicUsize::new(0),
        });
        let svc = service(provider.clone());
        let err = svc.compute_recommendation("2024-13-40").unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationFailure::Date(_))));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn offline_yields_no_equity_data() {
        let provider = Arc::new(NoNetwork {
            calls: AtomicUsize::new(0),
        });
        let svc = service(provider.clone()).with_parallel_fetch(false);
        let report = svc.compute_recommendation("2024-06-15").unwrap();

        assert_eq!(report.recommendation, Recommendation::NoEquityData);
        assert_eq!(report.returns.len(), 5);
        assert!(report.returns.iter().all(|r| !r.result.is_available()));
        assert!(!report.benchmark.result.is_available());
        // five instruments plus the benchmark
        assert_eq!(provider.calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn report_serializes_with_flat_result_fields() {
        let report = RecommendationReport {
            reference_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            returns: vec![InstrumentReturn::new("IWDA", ReturnResult::Unavailable)],
            benchmark: BenchmarkReturn {
                name: "S&P 500 (SPY)".into(),
                symbol: Ticker::parse("spy.us").unwrap(),
                result: ReturnResult::Available(gem_core::domain::ReturnWindow {
                    percentage_return: 12.5,
                    window_start: NaiveDate::from_ymd_opt(2023, 5, 16).unwrap(),
                    window_end: NaiveDate::from_ymd_opt(2024, 5, 15).unwrap(),
                    history: vec![PricePoint::new(
                        NaiveDate::from_ymd_opt(2023, 5, 16).unwrap(),
                        400.0,
                    )],
                }),
            },
            recommendation: Recommendation::NoEquityData,
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["reference_date"], "2024-06-15");
        assert_eq!(json["benchmark"]["symbol"], "spy.us");
        assert_eq!(json["benchmark"]["result"]["percentage_return"], 12.5);
        assert!(json["returns"][0]["result"]["percentage_return"].is_null());
        assert_eq!(json["recommendation"]["kind"], "no_equity_data");
    }
}
