use serde::{Deserialize, Serialize};

use super::ticker::Ticker;

/// Role an instrument plays in the GEM rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetClass {
    Equity,
    Bond,
}

impl AssetClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetClass::Equity => "equity",
            AssetClass::Bond => "bond",
        }
    }
}

/// A tradeable instrument: display name plus quote-source symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub name: String,
    pub symbol: Ticker,
    pub class: AssetClass,
}

impl Instrument {
    pub fn new(name: impl Into<String>, symbol: Ticker, class: AssetClass) -> Self {
        Self {
            name: name.into(),
            symbol,
            class,
        }
    }
}

/// Ordered set of instruments the strategy rotates between.
///
/// Order is significant: it is the iteration order the selector uses to
/// break ties between equal returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Universe {
    instruments: Vec<Instrument>,
}

impl Universe {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// Names of instruments in the given class, in universe order.
    pub fn names(&self, class: AssetClass) -> Vec<String> {
        self.instruments
            .iter()
            .filter(|i| i.class == class)
            .map(|i| i.name.clone())
            .collect()
    }

    pub fn equity_names(&self) -> Vec<String> {
        self.names(AssetClass::Equity)
    }

    pub fn bond_names(&self) -> Vec<String> {
        self.names(AssetClass::Bond)
    }

    pub fn get(&self, name: &str) -> Option<&Instrument> {
        self.instruments.iter().find(|i| i.name == name)
    }

    /// The ETF line-up the strategy was designed around (London listings on Stooq).
    pub fn default_gem() -> Self {
        let entries = [
            ("IWDA", "iwda.uk", AssetClass::Equity),
            ("EIMI", "eimi.uk", AssetClass::Equity),
            ("CNDX", "cndx.uk", AssetClass::Equity),
            ("IB01", "ib01.uk", AssetClass::Bond),
            ("CBU0", "cbu0.uk", AssetClass::Bond),
        ];
        let instruments = entries
            .into_iter()
            .filter_map(|(name, symbol, class)| {
                Ticker::parse(symbol)
                    .ok()
                    .map(|t| Instrument::new(name, t, class))
            })
            .collect();
        Self { instruments }
    }
}
