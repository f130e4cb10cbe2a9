use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a transaction bought or sold an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    /// Spent cash to acquire the asset
    Buy,
    /// Disposed of the asset for cash (net of tax)
    Sell,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Buy => write!(f, "Buy"),
            TransactionKind::Sell => write!(f, "Sell"),
        }
    }
}

/// Sort order for transaction listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionSortOrder {
    /// Newest first (default for display)
    TimeDesc,
    /// Oldest first
    TimeAsc,
    /// Largest gross value (quantity × price) first
    ValueDesc,
    /// Smallest gross value first
    ValueAsc,
    /// Alphabetical by asset id
    AssetAsc,
    /// Reverse alphabetical by asset id
    AssetDesc,
}

/// An immutable record of one completed buy or sell.
///
/// Created exactly once by the ledger engine when the operation is
/// applied; never modified afterwards. The transaction log is
/// append-only, so insertion order is chronological order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier, never reused
    pub id: Uuid,

    /// Asset this transaction traded (e.g., "bitcoin")
    pub asset_id: String,

    /// Amount of the asset traded (always positive)
    pub quantity: f64,

    /// Price per unit in the base currency at execution time (always positive)
    pub unit_price: f64,

    /// Buy or Sell
    pub kind: TransactionKind,

    /// Execution time. Non-decreasing across the transaction log.
    pub timestamp: DateTime<Utc>,

    /// Tax withheld from the proceeds. `Some` only for sells.
    #[serde(default)]
    pub tax_withheld: Option<f64>,
}

impl Transaction {
    /// Gross value of the transaction: quantity × unit price.
    #[must_use]
    pub fn gross_value(&self) -> f64 {
        self.quantity * self.unit_price
    }
}
