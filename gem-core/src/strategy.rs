//! GEM (Global Equities Momentum) decision rule.
//!
//! Pick the equity with the best trailing return if that return is positive;
//! otherwise rotate into the best-performing bond. Instruments without a
//! return are left out of consideration, never counted as 0 %.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::InstrumentReturn;
use crate::error::CalculationError;

/// Outcome of the GEM rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// Best equity return is positive.
    InvestInEquity { name: String },
    /// Equities are all non-positive; hold the best bond.
    InvestInBond { name: String },
    /// No equity has a usable return.
    NoEquityData,
    /// Equities are non-positive and no bond has a usable return.
    NoBondDataNegativeEquity,
}

impl Recommendation {
    /// Instrument to hold, if the rule picked one.
    pub fn instrument(&self) -> Option<&str> {
        match self {
            Recommendation::InvestInEquity { name } | Recommendation::InvestInBond { name } => {
                Some(name)
            }
            Recommendation::NoEquityData | Recommendation::NoBondDataNegativeEquity => None,
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::InvestInEquity { name } => write!(f, "Invest in {name}"),
            Recommendation::InvestInBond { name } => {
                write!(f, "Invest in {name} (capital protection)")
            }
            Recommendation::NoEquityData => f.write_str("Not enough data to make a decision."),
            Recommendation::NoBondDataNegativeEquity => f.write_str(
                "No bond data, and equities have a negative return. Consider holding cash.",
            ),
        }
    }
}

/// Apply the GEM rule to a set of instrument returns.
///
/// Ties are broken by input order: the first instrument with the maximal
/// return wins. Errors only on malformed input (a name in both sets, a
/// duplicate name, a non-finite return); missing data is a normal outcome.
pub fn select_gem(
    returns: &[InstrumentReturn],
    equity: &[String],
    bonds: &[String],
) -> Result<Recommendation, CalculationError> {
    check_contract(returns, equity, bonds)?;

    let Some((best_equity, equity_return)) = best_in(returns, equity) else {
        tracing::warn!("no equity data available for decision");
        return Ok(Recommendation::NoEquityData);
    };

    if equity_return > 0.0 {
        tracing::info!(
            instrument = best_equity,
            percentage_return = equity_return,
            "GEM: positive equity momentum"
        );
        return Ok(Recommendation::InvestInEquity {
            name: best_equity.to_string(),
        });
    }

    match best_in(returns, bonds) {
        Some((best_bond, bond_return)) => {
            tracing::info!(
                instrument = best_bond,
                percentage_return = bond_return,
                best_equity,
                equity_return,
                "GEM: negative equity momentum, rotating to bonds"
            );
            Ok(Recommendation::InvestInBond {
                name: best_bond.to_string(),
            })
        }
        None => {
            tracing::warn!(
                best_equity,
                equity_return,
                "GEM: negative equity momentum and no bond data"
            );
            Ok(Recommendation::NoBondDataNegativeEquity)
        }
    }
}

/// First instrument in `returns` with the highest available return among `set`.
fn best_in<'a>(returns: &'a [InstrumentReturn], set: &[String]) -> Option<(&'a str, f64)> {
    returns
        .iter()
        .filter(|r| set.contains(&r.name))
        .filter_map(|r| r.result.percentage_return().map(|p| (r.name.as_str(), p)))
        .fold(None, |best, (name, pct)| match best {
            Some((_, best_pct)) if pct <= best_pct => best,
            _ => Some((name, pct)),
        })
}

fn check_contract(
    returns: &[InstrumentReturn],
    equity: &[String],
    bonds: &[String],
) -> Result<(), CalculationError> {
    if let Some(both) = equity.iter().find(|e| bonds.contains(e)) {
        return Err(CalculationError::OverlappingSets(both.clone()));
    }

    let mut seen = HashSet::with_capacity(returns.len());
    for r in returns {
        if !seen.insert(r.name.as_str()) {
            return Err(CalculationError::DuplicateInstrument(r.name.clone()));
        }
        if let Some(value) = r.result.percentage_return() {
            if !value.is_finite() {
                return Err(CalculationError::NonFiniteReturn {
                    name: r.name.clone(),
                    value,
                });
            }
        }
    }
    Ok(())
}
