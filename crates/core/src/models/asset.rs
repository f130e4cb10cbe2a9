use serde::{Deserialize, Serialize};

/// A tradable cryptocurrency.
///
/// `id` is the opaque identifier the ledger keys holdings and
/// transactions by (e.g., "bitcoin"); `symbol` and `name` are display
/// metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CryptoAsset {
    /// Stable identifier used as the ledger key (e.g., "bitcoin")
    pub id: String,

    /// Ticker symbol (e.g., "BTC")
    pub symbol: String,

    /// Human-readable name (e.g., "Bitcoin")
    pub name: String,
}

impl CryptoAsset {
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into().to_uppercase(),
            name: name.into(),
        }
    }

    /// Binance trading pair for this asset, quoted in USDT
    /// (e.g., "BTCUSDT").
    #[must_use]
    pub fn binance_pair(&self) -> String {
        format!("{}USDT", self.symbol)
    }
}

/// The built-in set of tracked coins, in display order.
#[must_use]
pub fn catalog() -> Vec<CryptoAsset> {
    vec![
        CryptoAsset::new("bitcoin", "BTC", "Bitcoin"),
        CryptoAsset::new("ethereum", "ETH", "Ethereum"),
        CryptoAsset::new("binancecoin", "BNB", "Binance Coin"),
        CryptoAsset::new("ripple", "XRP", "XRP"),
        CryptoAsset::new("cardano", "ADA", "Cardano"),
        CryptoAsset::new("dogecoin", "DOGE", "Dogecoin"),
        CryptoAsset::new("solana", "SOL", "Solana"),
        CryptoAsset::new("polkadot", "DOT", "Polkadot"),
        CryptoAsset::new("polygon", "MATIC", "Polygon"),
        CryptoAsset::new("chainlink", "LINK", "Chainlink"),
    ]
}

/// Look up a catalog asset by its id.
#[must_use]
pub fn find_in_catalog(asset_id: &str) -> Option<CryptoAsset> {
    catalog().into_iter().find(|a| a.id == asset_id)
}
