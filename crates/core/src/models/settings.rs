use serde::{Deserialize, Serialize};

/// Default virtual cash a fresh ledger starts with.
pub const DEFAULT_STARTING_CASH: f64 = 10_000.0;

/// Flat tax rate withheld from sell proceeds (2%).
pub const DEFAULT_SELL_TAX_RATE: f64 = 0.02;

/// User-configurable settings, persisted inside the ledger file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Cash the ledger is (re)initialized with on creation and on reset.
    pub starting_cash: f64,

    /// Flat rate withheld from gross sell proceeds, in `[0, 1)`.
    pub sell_tax_rate: f64,

    /// Currency valuation outputs are displayed in (e.g., "USD", "EUR", "PLN").
    /// The ledger itself always stores and computes in USD.
    pub display_currency: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_cash: DEFAULT_STARTING_CASH,
            sell_tax_rate: DEFAULT_SELL_TAX_RATE,
            display_currency: "USD".to_string(),
        }
    }
}
