use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::quote::Quote;

/// Trait abstraction for market data sources.
///
/// The ledger engine never calls a source directly — the enclosing
/// application fetches a price first and passes it into the engine.
/// Implementations: Binance (live), simulated feed (offline/demo),
/// mocks in tests.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Current unit price of an asset in the base currency (USD).
    async fn get_price(&self, asset_id: &str) -> Result<f64, CoreError>;

    /// Current quotes for the whole built-in catalog.
    async fn get_quotes(&self) -> Result<Vec<Quote>, CoreError>;
}
