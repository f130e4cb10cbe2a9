use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::errors::CoreError;
use crate::models::asset::{self, CryptoAsset};
use crate::models::quote::Quote;
use super::traits::PriceSource;

const BASE_URL: &str = "https://api.binance.com/api/v3";

/// Binance public market data API.
///
/// - **Free**: no API key required for ticker endpoints.
/// - **Endpoints**: `/ticker/price?symbol=`, `/ticker/24hr?symbols=`
///
/// Binance quotes trading pairs, not coins; catalog assets are mapped
/// to their USDT pair (BTC → BTCUSDT), so all prices come back in USD
/// terms.
pub struct BinanceSource {
    client: Client,
}

/// Response of `/ticker/price` — price arrives as a decimal string.
#[derive(Debug, Deserialize)]
struct TickerPrice {
    price: String,
}

/// Response row of `/ticker/24hr`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    symbol: String,
    last_price: String,
    price_change_percent: String,
}

impl BinanceSource {
    pub fn new() -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }

    fn catalog_asset(asset_id: &str) -> Result<CryptoAsset, CoreError> {
        asset::find_in_catalog(asset_id)
            .ok_or_else(|| CoreError::PriceNotAvailable(asset_id.to_string()))
    }

    fn parse_decimal(raw: &str, context: &str) -> Result<f64, CoreError> {
        raw.parse::<f64>().map_err(|_| CoreError::Api {
            provider: "Binance".to_string(),
            message: format!("unparseable decimal '{raw}' in {context}"),
        })
    }
}

#[async_trait]
impl PriceSource for BinanceSource {
    fn name(&self) -> &str {
        "Binance"
    }

    async fn get_price(&self, asset_id: &str) -> Result<f64, CoreError> {
        let pair = Self::catalog_asset(asset_id)?.binance_pair();

        let url = format!("{BASE_URL}/ticker/price");
        let resp = self
            .client
            .get(&url)
            .query(&[("symbol", pair.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: "Binance".to_string(),
                message: format!("{} returned HTTP {}", pair, resp.status()),
            });
        }

        let ticker: TickerPrice = resp.json().await?;
        Self::parse_decimal(&ticker.price, "ticker/price")
    }

    async fn get_quotes(&self) -> Result<Vec<Quote>, CoreError> {
        let catalog = asset::catalog();
        let pairs: Vec<String> = catalog.iter().map(CryptoAsset::binance_pair).collect();
        // The 24hr endpoint takes a JSON array of pair names.
        let symbols = serde_json::to_string(&pairs)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;

        let url = format!("{BASE_URL}/ticker/24hr");
        let resp = self
            .client
            .get(&url)
            .query(&[("symbols", symbols.as_str())])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: "Binance".to_string(),
                message: format!("ticker/24hr returned HTTP {}", resp.status()),
            });
        }

        let tickers: Vec<Ticker24h> = resp.json().await?;

        let mut quotes = Vec::with_capacity(catalog.len());
        for asset in catalog {
            let pair = asset.binance_pair();
            let Some(ticker) = tickers.iter().find(|t| t.symbol == pair) else {
                continue; // pair missing from the response — skip, don't fail the listing
            };
            quotes.push(Quote {
                price: Self::parse_decimal(&ticker.last_price, "ticker/24hr")?,
                change_pct_24h: Self::parse_decimal(&ticker.price_change_percent, "ticker/24hr")?,
                asset,
            });
        }
        Ok(quotes)
    }
}

impl Default for BinanceSource {
    fn default() -> Self {
        Self::new()
    }
}
