//! Trailing-window return calculation.
//!
//! The GEM momentum signal is the 12-month return measured over a window
//! that ends one month before the reference date, skipping the most recent
//! month. For a reference date of 2024-06-15 the window is
//! 2023-05-16 ..= 2024-05-15.
//!
//! Pure functions, no I/O: identical inputs give identical outputs.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{PriceSeries, ReturnResult, ReturnWindow};

/// Shape of the trailing window, in calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailingWindow {
    /// Window length.
    pub lookback_months: u32,
    /// Gap between the window end and the reference date.
    pub skip_months: u32,
}

impl Default for TrailingWindow {
    fn default() -> Self {
        Self {
            lookback_months: 12,
            skip_months: 1,
        }
    }
}

impl TrailingWindow {
    pub fn new(lookback_months: u32, skip_months: u32) -> Self {
        Self {
            lookback_months,
            skip_months,
        }
    }

    /// Inclusive `(start, end)` dates of the window for a reference date.
    ///
    /// Month arithmetic clamps to the end of the month, so 2024-03-31 minus
    /// one month is 2024-02-29. Returns `None` only when the shift leaves
    /// chrono's representable range.
    pub fn bounds(&self, reference_date: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let end = reference_date.checked_sub_months(Months::new(self.skip_months))?;
        let start = end
            .checked_sub_months(Months::new(self.lookback_months))?
            .succ_opt()?;
        Some((start, end))
    }

    /// Compute the trailing return of `series` for `reference_date`.
    ///
    /// Unavailable when the window holds no prices, when either boundary
    /// price is not strictly positive, or when the ratio overflows.
    pub fn compute(&self, series: &PriceSeries, reference_date: NaiveDate) -> ReturnResult {
        let Some((start, end)) = self.bounds(reference_date) else {
            return ReturnResult::Unavailable;
        };

        let selected = series.between(start, end);
        let (Some(first), Some(last)) = (selected.first(), selected.last()) else {
            tracing::warn!(
                ticker = %series.ticker,
                %start,
                %end,
                "no prices inside trailing window"
            );
            return ReturnResult::Unavailable;
        };

        if !first.is_usable() || !last.is_usable() {
            tracing::warn!(
                ticker = %series.ticker,
                first = first.price,
                last = last.price,
                "unusable boundary prices"
            );
            return ReturnResult::Unavailable;
        }

        let percentage_return = (safe_divide(last.price, first.price, 1.0) - 1.0) * 100.0;
        if !percentage_return.is_finite() {
            tracing::warn!(
                ticker = %series.ticker,
                first = first.price,
                last = last.price,
                "trailing return is not finite"
            );
            return ReturnResult::Unavailable;
        }

        tracing::debug!(
            ticker = %series.ticker,
            percentage_return,
            window_start = %first.date,
            window_end = %last.date,
            points = selected.len(),
            "computed trailing return"
        );

        ReturnResult::Available(ReturnWindow {
            percentage_return,
            window_start: first.date,
            window_end: last.date,
            history: selected.to_vec(),
        })
    }
}

/// Trailing return with the standard 12-month window skipping one month.
pub fn compute_return(series: &PriceSeries, reference_date: NaiveDate) -> ReturnResult {
    TrailingWindow::default().compute(series, reference_date)
}

/// `numerator / denominator`, or `default` when the denominator is exactly zero.
///
/// The calculator rejects non-positive boundary prices before dividing, so
/// the fallback never fires there; it stays as a guard for other callers.
pub fn safe_divide(numerator: f64, denominator: f64, default: f64) -> f64 {
    if denominator == 0.0 {
        tracing::warn!(numerator, "division by zero, using default {default}");
        return default;
    }
    numerator / denominator
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PricePoint;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn series(points: &[(NaiveDate, f64)]) -> PriceSeries {
        PriceSeries::new(
            "test",
            points.iter().map(|&(d, p)| PricePoint::new(d, p)).collect(),
        )
    }

    #[test]
    fn window_bounds_standard() {
        let (start, end) = TrailingWindow::default().bounds(d(2024, 6, 15)).unwrap();
        assert_eq!(end, d(2024, 5, 15));
        assert_eq!(start, d(2023, 5, 16));
    }

    #[test]
    fn window_bounds_clamp_to_month_end() {
        let (start, end) = TrailingWindow::default().bounds(d(2024, 3, 31)).unwrap();
        assert_eq!(end, d(2024, 2, 29));
        // 2023-02-28 + 1 day
        assert_eq!(start, d(2023, 3, 1));
    }

    #[test]
    fn return_uses_first_and_last_in_window() {
        let s = series(&[
            (d(2023, 5, 15), 1.0),  // one day before the window
            (d(2023, 5, 16), 100.0), // first in window
            (d(2023, 11, 1), 130.0),
            (d(2024, 5, 15), 110.0), // last in window
            (d(2024, 5, 16), 500.0), // after window end
        ]);
        let r = compute_return(&s, d(2024, 6, 15));
        let w = r.window().expect("available");
        assert!((w.percentage_return - 10.0).abs() < 1e-9);
        assert_eq!(w.window_start, d(2023, 5, 16));
        assert_eq!(w.window_end, d(2024, 5, 15));
        assert_eq!(w.history.len(), 3);
    }

    #[test]
    fn negative_return() {
        let s = series(&[(d(2023, 6, 1), 200.0), (d(2024, 5, 1), 150.0)]);
        let r = compute_return(&s, d(2024, 6, 15));
        assert_eq!(r.percentage_return(), Some((150.0 / 200.0 - 1.0) * 100.0));
    }

    #[test]
    fn single_point_window_is_zero_return() {
        let s = series(&[(d(2024, 1, 10), 42.0)]);
        let r = compute_return(&s, d(2024, 6, 15));
        assert_eq!(r.percentage_return(), Some(0.0));
        assert_eq!(r.window_start(), r.window_end());
    }

    #[test]
    fn empty_window_is_unavailable() {
        let s = series(&[(d(2020, 1, 1), 10.0), (d(2020, 6, 1), 12.0)]);
        assert_eq!(compute_return(&s, d(2024, 6, 15)), ReturnResult::Unavailable);
        assert_eq!(
            compute_return(&PriceSeries::default(), d(2024, 6, 15)),
            ReturnResult::Unavailable
        );
    }

    #[test]
    fn non_positive_boundary_is_unavailable() {
        let zero_first = series(&[(d(2023, 6, 1), 0.0), (d(2024, 5, 1), 10.0)]);
        assert_eq!(
            compute_return(&zero_first, d(2024, 6, 15)),
            ReturnResult::Unavailable
        );

        let negative_last = series(&[(d(2023, 6, 1), 10.0), (d(2024, 5, 1), -1.0)]);
        assert_eq!(
            compute_return(&negative_last, d(2024, 6, 15)),
            ReturnResult::Unavailable
        );

        let nan_last = series(&[(d(2023, 6, 1), 10.0), (d(2024, 5, 1), f64::NAN)]);
        assert_eq!(
            compute_return(&nan_last, d(2024, 6, 15)),
            ReturnResult::Unavailable
        );
    }

    #[test]
    fn interior_bad_prices_do_not_matter() {
        let s = series(&[
            (d(2023, 6, 1), 10.0),
            (d(2023, 9, 1), 0.0),
            (d(2024, 5, 1), 12.0),
        ]);
        let r = compute_return(&s, d(2024, 6, 15));
        assert!(r.is_available());
    }

    #[test]
    fn custom_window() {
        let w = TrailingWindow::new(6, 0);
        let (start, end) = w.bounds(d(2024, 6, 15)).unwrap();
        assert_eq!(end, d(2024, 6, 15));
        assert_eq!(start, d(2023, 12, 16));
    }

    #[test]
    fn zero_lookback_selects_nothing() {
        let s = series(&[(d(2024, 5, 15), 10.0)]);
        let r = TrailingWindow::new(0, 1).compute(&s, d(2024, 6, 15));
        assert_eq!(r, ReturnResult::Unavailable);
    }

    #[test]
    fn safe_divide_fallback() {
        assert_eq!(safe_divide(5.0, 0.0, 1.0), 1.0);
        assert_eq!(safe_divide(5.0, 2.0, 1.0), 2.5);
    }

    #[test]
    fn overflowing_ratio_is_unavailable() {
        let s = series(&[(d(2023, 6, 1), 1e-320), (d(2024, 5, 1), 1.0)]);
        assert_eq!(compute_return(&s, d(2024, 6, 15)), ReturnResult::Unavailable);

        let s = series(&[(d(2023, 6, 1), 1e-300), (d(2024, 5, 1), f64::MAX)]);
        assert_eq!(compute_return(&s, d(2024, 6, 15)), ReturnResult::Unavailable);
    }
}
