//! Property tests for the return calculator and the GEM selector.
//!
//! Uses proptest to verify:
//! 1. Determinism: identical inputs give identical results
//! 2. Formula: the return is `(last / first - 1) * 100` over the window ends
//! 3. Window discipline: prices outside the window never affect the result
//! 4. Selector: the pick is always a maximal, in-set, available instrument

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use gem_core::domain::{InstrumentReturn, PricePoint, PriceSeries, ReturnResult};
use gem_core::returns::{compute_return, TrailingWindow};
use gem_core::strategy::{select_gem, Recommendation};

// ── Strategies (proptest) ────────────────────────────────────────────

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn arb_price() -> impl Strategy<Value = f64> {
    (1.0..1000.0_f64).prop_map(|p| (p * 100.0).round() / 100.0)
}

/// Daily series starting somewhere in 2022..2024 with positive prices.
fn arb_series() -> impl Strategy<Value = PriceSeries> {
    (0i64..700, prop::collection::vec(arb_price(), 1..400)).prop_map(|(offset, prices)| {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap() + Duration::days(offset);
        let points = prices
            .into_iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(start + Duration::days(i as i64), p))
            .collect();
        PriceSeries::new("prop", points)
    })
}

fn arb_return() -> impl Strategy<Value = Option<f64>> {
    prop::option::weighted(0.8, -50.0..50.0_f64)
}

fn available(pct: f64) -> ReturnResult {
    let date = reference();
    ReturnResult::Available(gem_core::domain::ReturnWindow {
        percentage_return: pct,
        window_start: date,
        window_end: date,
        history: vec![PricePoint::new(date, 1.0)],
    })
}

fn to_result(r: Option<f64>) -> ReturnResult {
    r.map(available).unwrap_or(ReturnResult::Unavailable)
}

// ── 1-3. Return calculator ───────────────────────────────────────────

proptest! {
    #[test]
    fn compute_is_deterministic(series in arb_series()) {
        prop_assert_eq!(
            compute_return(&series, reference()),
            compute_return(&series, reference())
        );
    }

    #[test]
    fn return_matches_boundary_formula(series in arb_series()) {
        let (start, end) = TrailingWindow::default().bounds(reference()).unwrap();
        let inside = series.between(start, end);

        match compute_return(&series, reference()) {
            ReturnResult::Available(w) => {
                let first = inside.first().unwrap();
                let last = inside.last().unwrap();
                let expected = (last.price / first.price - 1.0) * 100.0;
                prop_assert!((w.percentage_return - expected).abs() < 1e-9);
                prop_assert_eq!(w.window_start, first.date);
                prop_assert_eq!(w.window_end, last.date);
                prop_assert_eq!(w.history.len(), inside.len());
                prop_assert!(w.window_start >= start && w.window_end <= end);
            }
            ReturnResult::Unavailable => prop_assert!(inside.is_empty()),
        }
    }

    #[test]
    fn prices_outside_window_are_ignored(series in arb_series(), noise in arb_price()) {
        let (start, end) = TrailingWindow::default().bounds(reference()).unwrap();
        let mut points = series.points().to_vec();
        points.push(PricePoint::new(start - Duration::days(1), noise));
        points.push(PricePoint::new(end + Duration::days(1), noise));
        let noisy = PriceSeries::new("prop", points);

        prop_assert_eq!(
            compute_return(&series, reference()),
            compute_return(&noisy, reference())
        );
    }

    #[test]
    fn non_positive_first_price_is_unavailable(
        series in arb_series(),
        bad in prop_oneof![Just(0.0), Just(-1.0), Just(f64::NAN)],
    ) {
        let (start, end) = TrailingWindow::default().bounds(reference()).unwrap();
        let mut points: Vec<PricePoint> = series.between(start, end).to_vec();
        prop_assume!(!points.is_empty());
        points[0].price = bad;
        let poisoned = PriceSeries::new("prop", points);

        prop_assert_eq!(compute_return(&poisoned, reference()), ReturnResult::Unavailable);
    }
}

// ── 4. GEM selector ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn selection_is_consistent_with_returns(
        equity in prop::collection::vec(arb_return(), 0..5),
        bonds in prop::collection::vec(arb_return(), 0..4),
    ) {
        let equity_names: Vec<String> = (0..equity.len()).map(|i| format!("E{i}")).collect();
        let bond_names: Vec<String> = (0..bonds.len()).map(|i| format!("B{i}")).collect();

        let returns: Vec<InstrumentReturn> = equity_names
            .iter()
            .zip(&equity)
            .chain(bond_names.iter().zip(&bonds))
            .map(|(n, r)| InstrumentReturn::new(n.clone(), to_result(*r)))
            .collect();

        let best = |xs: &[Option<f64>]| {
            xs.iter().flatten().copied().fold(None, |acc: Option<f64>, x| {
                Some(acc.map_or(x, |a| a.max(x)))
            })
        };
        let best_equity = best(&equity);
        let best_bond = best(&bonds);

        let rec = select_gem(&returns, &equity_names, &bond_names).unwrap();
        match rec {
            Recommendation::InvestInEquity { name } => {
                let idx: usize = name[1..].parse().unwrap();
                prop_assert!(name.starts_with('E'));
                prop_assert_eq!(equity[idx], best_equity);
                prop_assert!(best_equity.unwrap() > 0.0);
            }
            Recommendation::InvestInBond { name } => {
                let idx: usize = name[1..].parse().unwrap();
                prop_assert!(name.starts_with('B'));
                prop_assert_eq!(bonds[idx], best_bond);
                prop_assert!(best_equity.unwrap() <= 0.0);
            }
            Recommendation::NoEquityData => prop_assert!(best_equity.is_none()),
            Recommendation::NoBondDataNegativeEquity => {
                prop_assert!(best_equity.unwrap() <= 0.0);
                prop_assert!(best_bond.is_none());
            }
        }
    }
}
