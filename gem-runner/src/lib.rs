//! GEM Runner: configuration, logging, the recommendation service and reports.
//!
//! This crate builds on `gem-core` to provide:
//! - TOML configuration with defaults, env overrides and validation
//! - `tracing-subscriber` setup (pretty, json, compact)
//! - The recommendation service: universe + benchmark through the cache
//! - Report assembly: rounded rows, chart datasets, data-quality flags
//! - Performance metrics over a return window

pub mod config;
pub mod logging;
pub mod metrics;
pub mod report;
pub mod service;

pub use config::{ConfigError, GemConfig};
pub use logging::{init_logging, LogConfig, LogFormat, LoggingError};
pub use metrics::PerformanceMetrics;
pub use report::{ChartDataset, DataQuality, ReportView, ReturnRow};
pub use service::{Benchmark, RecommendationReport, RecommendationService, ServiceError};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn service_is_send_sync() {
        assert_send::<RecommendationService>();
        assert_sync::<RecommendationService>();
    }

    #[test]
    fn report_types_are_send_sync() {
        assert_send::<RecommendationReport>();
        assert_sync::<RecommendationReport>();
        assert_send::<ReportView>();
        assert_sync::<ReportView>();
        assert_send::<GemConfig>();
        assert_sync::<GemConfig>();
    }
}
