use crate::errors::CoreError;
use crate::models::quote::Quote;
use crate::providers::binance::BinanceSource;
use crate::providers::simulated::SimulatedSource;
use crate::providers::traits::PriceSource;

/// Fetches current prices from an ordered list of sources with
/// automatic fallback.
///
/// Sources are tried in registration order. If the primary fails (API
/// down, rate limited, offline), the next one is tried; the simulated
/// feed at the end of the default list means a price is always
/// obtainable for catalog assets. Returned prices are validated to be
/// finite and positive before they reach the ledger.
pub struct PriceService {
    sources: Vec<Box<dyn PriceSource>>,
}

impl PriceService {
    pub fn new(sources: Vec<Box<dyn PriceSource>>) -> Self {
        Self { sources }
    }

    /// Default source chain: live Binance data, falling back to the
    /// simulated feed when the network is unavailable.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(vec![
            Box::new(BinanceSource::new()),
            Box::new(SimulatedSource::new()),
        ])
    }

    /// Names of the registered sources, in fallback order.
    #[must_use]
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Current unit price of an asset in the base currency.
    pub async fn get_price(&self, asset_id: &str) -> Result<f64, CoreError> {
        if self.sources.is_empty() {
            return Err(CoreError::NoPriceSource);
        }

        let mut last_error = None;
        for source in &self.sources {
            match source.get_price(asset_id).await {
                Ok(price) => {
                    if !price.is_finite() || price <= 0.0 {
                        last_error = Some(CoreError::Api {
                            provider: source.name().to_string(),
                            message: format!(
                                "invalid price returned for {asset_id}: {price} (must be finite and positive)"
                            ),
                        });
                        continue;
                    }
                    return Ok(price);
                }
                Err(e) => {
                    last_error = Some(e);
                    // Try next source
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoPriceSource))
    }

    /// Market listing for the whole catalog (prices + 24h change).
    pub async fn get_quotes(&self) -> Result<Vec<Quote>, CoreError> {
        if self.sources.is_empty() {
            return Err(CoreError::NoPriceSource);
        }

        let mut last_error = None;
        for source in &self.sources {
            match source.get_quotes().await {
                Ok(quotes) => {
                    match quotes.iter().find(|q| !q.price.is_finite() || q.price <= 0.0) {
                        Some(bad) => {
                            last_error = Some(CoreError::Api {
                                provider: source.name().to_string(),
                                message: format!(
                                    "invalid price returned for {}: {} (must be finite and positive)",
                                    bad.asset.id, bad.price
                                ),
                            });
                        }
                        None => return Ok(quotes),
                    }
                }
                Err(e) => {
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoPriceSource))
    }
}
