//! CSV price-history parsing.
//!
//! Stooq serves daily history as comma-separated text whose headers depend on
//! the site language: `Date,Open,High,Low,Close,Volume` on the English site and
//! `Data,Otwarcie,Najwyzszy,Najnizszy,Zamkniecie,Wolumen` on the Polish one.
//! Both are accepted, matched case-insensitively.

use chrono::NaiveDate;

use crate::domain::{PricePoint, PriceSeries};
use crate::error::FetchFailure;

const DATE_COLUMNS: [&str; 2] = ["date", "data"];
const CLOSE_COLUMNS: [&str; 2] = ["close", "zamkniecie"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y%m%d"];

/// Parse a CSV body into a price series sorted ascending by date.
///
/// Failure order: malformed CSV, then no data rows, then missing columns,
/// then the first row with an unparseable date. Unparseable closes do not
/// fail the parse; they become NaN so the return calculator can reject them
/// if they land on a window boundary.
pub fn parse_price_csv(ticker: &str, body: &str) -> Result<PriceSeries, FetchFailure> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let records = reader
        .records()
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|r| r.iter().any(|field| !field.is_empty()))
        .collect::<Vec<_>>();

    if records.is_empty() {
        return Err(FetchFailure::Empty);
    }

    let close_idx = find_column(&headers, &CLOSE_COLUMNS).ok_or_else(|| {
        FetchFailure::MissingColumns {
            missing: "close",
            found: headers.clone(),
        }
    })?;
    let date_idx =
        find_column(&headers, &DATE_COLUMNS).ok_or_else(|| FetchFailure::MissingColumns {
            missing: "date",
            found: headers.clone(),
        })?;

    let mut points = Vec::with_capacity(records.len());
    let mut unusable = 0usize;

    for (row, record) in records.iter().enumerate() {
        let raw_date = record.get(date_idx).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| {
            FetchFailure::Unparseable(format!("row {}: invalid date '{raw_date}'", row + 1))
        })?;

        let price = match record.get(close_idx).map(str::parse::<f64>) {
            Some(Ok(p)) => p,
            _ => {
                unusable += 1;
                f64::NAN
            }
        };

        points.push(PricePoint::new(date, price));
    }

    if unusable > 0 {
        tracing::debug!(ticker, unusable, "rows with unparseable close kept as NaN");
    }

    Ok(PriceSeries::new(ticker, points))
}

fn find_column(headers: &[String], candidates: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| candidates.iter().any(|c| h.eq_ignore_ascii_case(c)))
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}
