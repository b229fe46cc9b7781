//! Performance metrics over a return window's price history.
//!
//! Pure functions: price history in, statistics out. Only usable prices
//! (finite and positive) are considered.

use gem_core::domain::PricePoint;
use serde::{Deserialize, Serialize};

/// Summary statistics for one instrument's window, rounded to 2 decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    /// `(last / first - 1) * 100` over the usable prices.
    pub total_return: f64,
    /// Sample standard deviation of daily % changes.
    pub volatility: f64,
    /// Number of usable prices.
    pub data_points: usize,
}

impl PerformanceMetrics {
    /// `None` with fewer than two usable prices.
    pub fn compute(history: &[PricePoint]) -> Option<Self> {
        let prices: Vec<f64> = history
            .iter()
            .filter(|p| p.is_usable())
            .map(|p| p.price)
            .collect();

        let (&first, &last) = (prices.first()?, prices.last()?);
        if prices.len() < 2 {
            return None;
        }

        let daily = daily_returns(&prices);

        Some(Self {
            total_return: round2((last / first - 1.0) * 100.0),
            volatility: round2(sample_std_dev(&daily)),
            data_points: prices.len(),
        })
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Day-over-day percentage changes.
pub fn daily_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .map(|w| (w[1] / w[0] - 1.0) * 100.0)
        .collect()
}

/// Sample (n - 1) standard deviation; 0 with fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    var.sqrt()
}

/// Round half away from zero to 2 decimals.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn history(prices: &[f64]) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| PricePoint::new(start + chrono::Duration::days(i as i64), p))
            .collect()
    }

    #[test]
    fn flat_series_has_zero_volatility() {
        let m = PerformanceMetrics::compute(&history(&[50.0, 50.0, 50.0])).unwrap();
        assert_eq!(m.total_return, 0.0);
        assert_eq!(m.volatility, 0.0);
        assert_eq!(m.data_points, 3);
    }

    #[test]
    fn known_values() {
        // daily: +10 %, -10 %  -> mean 0, sample sd = sqrt(200) = 14.142...
        let m = PerformanceMetrics::compute(&history(&[100.0, 110.0, 99.0])).unwrap();
        assert_eq!(m.total_return, -1.0);
        assert_eq!(m.volatility, 14.14);
    }

    #[test]
    fn single_daily_return_has_zero_volatility() {
        let m = PerformanceMetrics::compute(&history(&[100.0, 120.0])).unwrap();
        assert_eq!(m.total_return, 20.0);
        assert_eq!(m.volatility, 0.0);
    }

    #[test]
    fn unusable_prices_are_skipped() {
        let m = PerformanceMetrics::compute(&history(&[100.0, f64::NAN, 0.0, 105.0])).unwrap();
        assert_eq!(m.data_points, 2);
        assert_eq!(m.total_return, 5.0);
    }

    #[test]
    fn too_short_history_is_none() {
        assert!(PerformanceMetrics::compute(&[]).is_none());
        assert!(PerformanceMetrics::compute(&history(&[10.0])).is_none());
        assert!(PerformanceMetrics::compute(&history(&[10.0, -1.0])).is_none());
    }

    #[test]
    fn rounding() {
        assert_eq!(round2(12.345_678), 12.35);
        assert_eq!(round2(-0.004), -0.0);
        assert_eq!(round2(7.0), 7.0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn volatility_is_non_negative(prices in prop::collection::vec(1.0f64..1000.0, 2..60)) {
                let m = PerformanceMetrics::compute(&history(&prices)).unwrap();
                prop_assert!(m.volatility >= 0.0);
                prop_assert_eq!(m.data_points, prices.len());
            }

            #[test]
            fn scaling_prices_leaves_metrics_unchanged(
                prices in prop::collection::vec(1.0f64..1000.0, 2..30),
                factor in 0.5f64..4.0,
            ) {
                let base = PerformanceMetrics::compute(&history(&prices)).unwrap();
                let scaled: Vec<f64> = prices.iter().map(|p| p * factor).collect();
                let other = PerformanceMetrics::compute(&history(&scaled)).unwrap();
                prop_assert!((base.total_return - other.total_return).abs() <= 0.011);
                prop_assert!((base.volatility - other.volatility).abs() <= 0.011);
            }

            #[test]
            fn round2_stays_within_half_a_cent(x in -1e6f64..1e6) {
                prop_assert!((round2(x) - x).abs() <= 0.005 + 1e-9);
            }
        }
    }
}
