use serde::{Deserialize, Serialize};

use super::asset::CryptoAsset;

/// One row of the market listing: an asset with its current price
/// and 24-hour percentage change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// The quoted asset
    pub asset: CryptoAsset,

    /// Current price per unit in the base currency
    pub price: f64,

    /// Percentage price change over the last 24 hours
    pub change_pct_24h: f64,
}
