use std::collections::HashMap;

use crate::models::ledger::{Holding, Ledger};
use crate::models::valuation::{AssetValuation, PortfolioSummary, PositionSummary};

/// Computes market value and unrealized profit/loss for held assets.
///
/// Pure functions over (holdings, price map) — prices are supplied by
/// the caller, never fetched here. A missing price is a soft miss
/// (feeds lag), valued at zero rather than treated as an error.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Value every holding against the supplied current prices.
    ///
    /// Per asset: `market_value = quantity × price`,
    /// `unrealized_pnl = market_value − quantity × average_cost`,
    /// `unrealized_pnl_pct = (price / average_cost − 1) × 100`.
    /// The percentage falls back to 0 when the cost basis is zero.
    #[must_use]
    pub fn compute_valuation(
        &self,
        holdings: &HashMap<String, Holding>,
        prices: &HashMap<String, f64>,
    ) -> HashMap<String, AssetValuation> {
        holdings
            .iter()
            .map(|(asset_id, holding)| {
                let valuation = match prices.get(asset_id) {
                    Some(&price) => Self::value_position(holding, price),
                    None => AssetValuation {
                        market_value: 0.0,
                        unrealized_pnl: -holding.cost_basis(),
                        unrealized_pnl_pct: 0.0,
                    },
                };
                (asset_id.clone(), valuation)
            })
            .collect()
    }

    /// Cash plus the market value of every position.
    #[must_use]
    pub fn compute_total_value(
        &self,
        cash_balance: f64,
        valuations: &HashMap<String, AssetValuation>,
    ) -> f64 {
        cash_balance + valuations.values().map(|v| v.market_value).sum::<f64>()
    }

    /// Assemble a full portfolio summary in the base currency (USD).
    /// Positions are sorted by asset id for deterministic output.
    #[must_use]
    pub fn portfolio_summary(
        &self,
        ledger: &Ledger,
        prices: &HashMap<String, f64>,
    ) -> PortfolioSummary {
        let valuations = self.compute_valuation(&ledger.holdings, prices);

        let mut positions: Vec<PositionSummary> = ledger
            .holdings
            .iter()
            .map(|(asset_id, holding)| PositionSummary {
                asset_id: asset_id.clone(),
                quantity: holding.quantity,
                average_cost: holding.average_cost,
                valuation: valuations
                    .get(asset_id)
                    .cloned()
                    .unwrap_or(AssetValuation {
                        market_value: 0.0,
                        unrealized_pnl: 0.0,
                        unrealized_pnl_pct: 0.0,
                    }),
            })
            .collect();
        positions.sort_by(|a, b| a.asset_id.cmp(&b.asset_id));

        let holdings_value: f64 = positions.iter().map(|p| p.valuation.market_value).sum();
        let total_unrealized_pnl: f64 = positions.iter().map(|p| p.valuation.unrealized_pnl).sum();

        PortfolioSummary {
            currency: "USD".to_string(),
            cash_balance: ledger.cash_balance,
            holdings_value,
            total_value: ledger.cash_balance + holdings_value,
            total_unrealized_pnl,
            positions,
        }
    }

    fn value_position(holding: &Holding, price: f64) -> AssetValuation {
        let market_value = holding.quantity * price;
        let unrealized_pnl = market_value - holding.cost_basis();
        // Guard the division even though a holding always gets its
        // average cost set at first buy.
        let unrealized_pnl_pct = if holding.average_cost > 0.0 {
            (price / holding.average_cost - 1.0) * 100.0
        } else {
            0.0
        };
        AssetValuation {
            market_value,
            unrealized_pnl,
            unrealized_pnl_pct,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
