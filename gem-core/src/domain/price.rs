//! Price points and daily price series.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closing price of one instrument on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    /// A price is usable only if it is finite and strictly positive.
    ///
    /// Unparseable closes are stored as NaN, which fails this check.
    pub fn is_usable(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Daily closes for one ticker, ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    pub ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting points ascending by date.
    ///
    /// The sort is stable, so duplicate dates keep their source order.
    pub fn new(ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        Self {
            ticker: ticker.into(),
            points,
        }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Points with `start <= date <= end`, in ascending order.
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> &[PricePoint] {
        if start > end {
            return &[];
        }
        let lo = self.points.partition_point(|p| p.date < start);
        let hi = self.points.partition_point(|p| p.date <= end);
        &self.points[lo..hi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn new_sorts_ascending() {
        let s = PriceSeries::new(
            "spy.us",
            vec![
                PricePoint::new(d(2024, 1, 3), 2.0),
                PricePoint::new(d(2024, 1, 1), 1.0),
                PricePoint::new(d(2024, 1, 2), 1.5),
            ],
        );
        let dates: Vec<_> = s.points().iter().map(|p| p.date).collect();
        assert_eq!(dates, vec![d(2024, 1, 1), d(2024, 1, 2), d(2024, 1, 3)]);
        assert_eq!(s.first_date(), Some(d(2024, 1, 1)));
        assert_eq!(s.last_date(), Some(d(2024, 1, 3)));
    }

    #[test]
    fn between_is_inclusive_on_both_ends() {
        let s = PriceSeries::new(
            "x",
            (1..=10).map(|i| PricePoint::new(d(2024, 1, i), i as f64)).collect(),
        );
        let w = s.between(d(2024, 1, 3), d(2024, 1, 5));
        assert_eq!(w.len(), 3);
        assert_eq!(w[0].price, 3.0);
        assert_eq!(w[2].price, 5.0);
    }

    #[test]
    fn between_outside_range_is_empty() {
        let s = PriceSeries::new("x", vec![PricePoint::new(d(2024, 1, 1), 1.0)]);
        assert!(s.between(d(2025, 1, 1), d(2025, 12, 31)).is_empty());
        assert!(s.between(d(2024, 1, 2), d(2024, 1, 1)).is_empty());
    }

    #[test]
    fn usability() {
        assert!(PricePoint::new(d(2024, 1, 1), 0.01).is_usable());
        assert!(!PricePoint::new(d(2024, 1, 1), 0.0).is_usable());
        assert!(!PricePoint::new(d(2024, 1, 1), -3.0).is_usable());
        assert!(!PricePoint::new(d(2024, 1, 1), f64::NAN).is_usable());
        assert!(!PricePoint::new(d(2024, 1, 1), f64::INFINITY).is_usable());
    }
}
