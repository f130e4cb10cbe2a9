use serde::{Deserialize, Serialize};

/// Market valuation of a single held asset against a current price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetValuation {
    /// quantity × current price. Zero when no price was available.
    pub market_value: f64,

    /// market_value − quantity × average cost
    pub unrealized_pnl: f64,

    /// (current price / average cost − 1) × 100.
    /// Zero when the cost basis is zero or no price was available.
    pub unrealized_pnl_pct: f64,
}

/// Per-asset line of a portfolio summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    /// Asset id (ledger key)
    pub asset_id: String,

    /// Amount held
    pub quantity: f64,

    /// Weighted-average unit cost basis
    pub average_cost: f64,

    /// Current valuation of the position
    pub valuation: AssetValuation,
}

/// Snapshot of the whole portfolio's worth at current prices.
///
/// All monetary fields are in the display currency named by `currency`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Currency all monetary values below are expressed in
    pub currency: String,

    /// Cash on hand
    pub cash_balance: f64,

    /// Sum of all position market values
    pub holdings_value: f64,

    /// cash_balance + holdings_value
    pub total_value: f64,

    /// Sum of unrealized gain/loss across positions
    pub total_unrealized_pnl: f64,

    /// Per-asset breakdown, sorted by asset id
    pub positions: Vec<PositionSummary>,
}
