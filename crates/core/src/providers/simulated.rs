use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::errors::CoreError;
use crate::models::asset;
use crate::models::quote::Quote;
use super::traits::PriceSource;

/// Reference prices the simulation jitters around, per catalog asset.
const BASE_PRICES: &[(&str, f64)] = &[
    ("bitcoin", 65_000.0),
    ("ethereum", 3_500.0),
    ("binancecoin", 580.0),
    ("ripple", 0.6),
    ("cardano", 0.45),
    ("dogecoin", 0.12),
    ("solana", 150.0),
    ("polkadot", 6.5),
    ("polygon", 0.7),
    ("chainlink", 15.0),
];

/// Simulated market data: each asset's price is its base price moved by
/// a pseudo-random amount within ±5%.
///
/// Fully deterministic for a given seed, so demo runs and tests are
/// reproducible. Used as the offline fallback behind the live source.
pub struct SimulatedSource {
    seed: u64,
}

impl SimulatedSource {
    /// A feed with a random seed — every construction is a different
    /// market day.
    pub fn new() -> Self {
        Self {
            seed: rand::random(),
        }
    }

    /// A feed with a fixed seed, for reproducible prices.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    fn base_price(asset_id: &str) -> Option<f64> {
        BASE_PRICES
            .iter()
            .find(|(id, _)| *id == asset_id)
            .map(|(_, price)| *price)
    }

    /// Percentage move in (−5, 5) for this asset under the current seed.
    fn jitter_pct(&self, asset_id: &str) -> f64 {
        let mut hasher = DefaultHasher::new();
        asset_id.hash(&mut hasher);
        let mut rng = StdRng::seed_from_u64(self.seed ^ hasher.finish());
        rng.gen_range(-5.0..5.0)
    }

    fn simulate(&self, asset_id: &str) -> Option<(f64, f64)> {
        let base = Self::base_price(asset_id)?;
        let pct = self.jitter_pct(asset_id);
        Some((base * (1.0 + pct / 100.0), pct))
    }
}

#[async_trait]
impl PriceSource for SimulatedSource {
    fn name(&self) -> &str {
        "Simulated"
    }

    async fn get_price(&self, asset_id: &str) -> Result<f64, CoreError> {
        self.simulate(asset_id)
            .map(|(price, _)| price)
            .ok_or_else(|| CoreError::PriceNotAvailable(asset_id.to_string()))
    }

    async fn get_quotes(&self) -> Result<Vec<Quote>, CoreError> {
        Ok(asset::catalog()
            .into_iter()
            .filter_map(|asset| {
                let (price, change_pct_24h) = self.simulate(&asset.id)?;
                Some(Quote {
                    asset,
                    price,
                    change_pct_24h,
                })
            })
            .collect())
    }
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}
