//! Presentation shapes for a recommendation report.
//!
//! Turns a [`RecommendationReport`] into display rows rounded to 2 decimals,
//! chart datasets, per-instrument data-quality flags and performance
//! metrics, then renders the lot as plain text. The same view serializes
//! to JSON for machine consumers.

use chrono::NaiveDate;
use gem_core::domain::{AssetClass, ReturnResult, Universe};
use gem_core::strategy::Recommendation;
use serde::{Deserialize, Serialize};

use crate::metrics::{round2, PerformanceMetrics};
use crate::service::RecommendationReport;

/// One table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRow {
    pub name: String,
    pub symbol: String,
    /// `None` for the benchmark.
    pub class: Option<AssetClass>,
    /// Rounded to 2 decimals.
    pub percentage_return: Option<f64>,
    pub window_start: Option<NaiveDate>,
    pub window_end: Option<NaiveDate>,
}

/// Price history of one instrument, ready for plotting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    pub name: String,
    pub labels: Vec<NaiveDate>,
    pub prices: Vec<f64>,
}

/// Completeness flags for one result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub has_return: bool,
    pub has_dates: bool,
    pub has_history: bool,
    pub complete: bool,
}

impl DataQuality {
    pub fn of(result: &ReturnResult) -> Self {
        let has_return = result.percentage_return().is_some();
        let has_dates = result.window_start().is_some() && result.window_end().is_some();
        let has_history = result.history().is_some_and(|h| !h.is_empty());
        Self {
            has_return,
            has_dates,
            has_history,
            complete: has_return && has_dates && has_history,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentDiagnostics {
    pub name: String,
    pub quality: DataQuality,
    pub metrics: Option<PerformanceMetrics>,
}

/// Everything a front end needs to display one recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportView {
    pub reference_date: NaiveDate,
    pub recommendation: Recommendation,
    pub message: String,
    pub rows: Vec<ReturnRow>,
    pub benchmark: ReturnRow,
    pub charts: Vec<ChartDataset>,
    pub diagnostics: Vec<InstrumentDiagnostics>,
}

impl ReportView {
    /// Build the view; `universe` supplies symbols and classes.
    pub fn assemble(report: &RecommendationReport, universe: &Universe) -> Self {
        let rows = report
            .returns
            .iter()
            .map(|r| {
                let instrument = universe.get(&r.name);
                row(
                    &r.name,
                    instrument.map(|i| i.symbol.to_string()).unwrap_or_default(),
                    instrument.map(|i| i.class),
                    &r.result,
                )
            })
            .collect();

        let benchmark = row(
            &report.benchmark.name,
            report.benchmark.symbol.to_string(),
            None,
            &report.benchmark.result,
        );

        let named_results = report
            .returns
            .iter()
            .map(|r| (r.name.as_str(), &r.result))
            .chain(std::iter::once((
                report.benchmark.name.as_str(),
                &report.benchmark.result,
            )));

        let mut charts = Vec::new();
        let mut diagnostics = Vec::new();
        for (name, result) in named_results {
            if let Some(history) = result.history().filter(|h| !h.is_empty()) {
                charts.push(ChartDataset {
                    name: name.to_string(),
                    labels: history.iter().map(|p| p.date).collect(),
                    prices: history.iter().map(|p| p.price).collect(),
                });
            }
            diagnostics.push(InstrumentDiagnostics {
                name: name.to_string(),
                quality: DataQuality::of(result),
                metrics: result.history().and_then(PerformanceMetrics::compute),
            });
        }

        tracing::debug!(datasets = charts.len(), "assembled chart data");

        Self {
            reference_date: report.reference_date,
            message: report.recommendation.to_string(),
            recommendation: report.recommendation.clone(),
            rows,
            benchmark,
            charts,
            diagnostics,
        }
    }

    /// Plain-text rendering for terminals.
    pub fn render_text(&self) -> String {
        let mut out = format!(
            "GEM recommendation for {}\n\n{}\n\n",
            self.reference_date, self.message
        );

        out.push_str(&format!(
            "{:<16} {:<10} {:<7} {:>9}  {:<23}\n",
            "Instrument", "Symbol", "Class", "Return", "Window"
        ));
        out.push_str(&format!("{}\n", "-".repeat(69)));
        for r in self.rows.iter().chain(std::iter::once(&self.benchmark)) {
            out.push_str(&format!(
                "{:<16} {:<10} {:<7} {:>9}  {:<23}\n",
                r.name,
                r.symbol,
                r.class.map(|c| c.as_str()).unwrap_or("bench"),
                format_return(r.percentage_return),
                format_window(r.window_start, r.window_end),
            ));
        }

        let incomplete: Vec<&str> = self
            .diagnostics
            .iter()
            .filter(|d| !d.quality.complete)
            .map(|d| d.name.as_str())
            .collect();
        if !incomplete.is_empty() {
            out.push_str(&format!("\nNo data: {}\n", incomplete.join(", ")));
        }
        out
    }
}

fn row(name: &str, symbol: String, class: Option<AssetClass>, result: &ReturnResult) -> ReturnRow {
    ReturnRow {
        name: name.to_string(),
        symbol,
        class,
        percentage_return: result.percentage_return().map(round2),
        window_start: result.window_start(),
        window_end: result.window_end(),
    }
}

fn format_return(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:+.2}%"),
        None => "n/a".to_string(),
    }
}

fn format_window(start: Option<NaiveDate>, end: Option<NaiveDate>) -> String {
    match (start, end) {
        (Some(s), Some(e)) => format!("{s} .. {e}"),
        _ => "-".to_string(),
    }
}
