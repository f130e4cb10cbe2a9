use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::settings::Settings;
use super::transaction::Transaction;

/// Accumulated ownership of one asset.
///
/// Created implicitly on the first buy, removed from the holdings map
/// the moment its quantity reaches zero — an entry with zero quantity
/// never persists (absence means no position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    /// Amount owned. Strictly positive while the entry exists.
    pub quantity: f64,

    /// Weighted-average unit cost basis in the base currency.
    /// Recomputed on every buy; left unchanged by partial sells.
    pub average_cost: f64,
}

impl Holding {
    /// Total cost basis of the position: quantity × average cost.
    #[must_use]
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.average_cost
    }
}

/// The main data container: cash balance, holdings, transaction log,
/// and user settings. This is the unit of persistence — everything in
/// here gets serialized and saved as a .tsim file.
///
/// Mutated only through `LedgerService`; every other component reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    /// Virtual cash in the base currency. Never negative.
    pub cash_balance: f64,

    /// One entry per asset with a positive position, keyed by asset id.
    pub holdings: HashMap<String, Holding>,

    /// Append-only history of every applied buy/sell, oldest first.
    pub transactions: Vec<Transaction>,

    /// User settings (starting cash, tax rate, display currency).
    #[serde(default)]
    pub settings: Settings,
}

impl Ledger {
    /// A fresh ledger: full starting cash, no positions, empty log.
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        Self {
            cash_balance: settings.starting_cash,
            holdings: HashMap::new(),
            transactions: Vec::new(),
            settings,
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
