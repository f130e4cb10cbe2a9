use chrono::{DateTime, Utc};
use std::collections::HashSet;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::ledger::{Holding, Ledger};
use crate::models::transaction::{Transaction, TransactionKind};

/// The ledger engine: applies buy/sell transactions to the cash balance
/// and holdings, enforcing solvency invariants.
///
/// Pure business logic — no I/O, no API calls, no clocks beyond the
/// transaction timestamp. Every operation either passes all checks and
/// commits the full state transition plus log append, or fails before
/// any write, leaving the ledger untouched.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Apply a buy: deduct `quantity × unit_price` from cash and fold
    /// the purchase into the holding's weighted-average cost basis.
    ///
    /// Fails with `InvalidArgument` for non-positive or non-finite
    /// quantity/price, and `InsufficientFunds` if the cost exceeds the
    /// cash balance. Returns the appended transaction.
    pub fn apply_buy(
        &self,
        ledger: &mut Ledger,
        asset_id: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Transaction, CoreError> {
        Self::validate_order(asset_id, quantity, unit_price)?;

        let cost = quantity * unit_price;
        if cost > ledger.cash_balance {
            return Err(CoreError::InsufficientFunds {
                required: cost,
                available: ledger.cash_balance,
            });
        }

        ledger.cash_balance -= cost;

        match ledger.holdings.get_mut(asset_id) {
            Some(holding) => {
                let new_quantity = holding.quantity + quantity;
                holding.average_cost = (holding.cost_basis() + cost) / new_quantity;
                holding.quantity = new_quantity;
            }
            None => {
                ledger.holdings.insert(
                    asset_id.to_string(),
                    Holding {
                        quantity,
                        average_cost: unit_price,
                    },
                );
            }
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            asset_id: asset_id.to_string(),
            quantity,
            unit_price,
            kind: TransactionKind::Buy,
            timestamp: Self::next_timestamp(ledger),
            tax_withheld: None,
        };
        ledger.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// Apply a sell: credit the net proceeds (gross minus withheld tax)
    /// to cash and reduce the holding. The average cost of the remaining
    /// units is unaffected by a partial sale; selling the full position
    /// removes the holding entry entirely.
    ///
    /// Fails with `InvalidArgument`, `UnknownAsset`, or
    /// `InsufficientHoldings`. Returns the appended transaction.
    pub fn apply_sell(
        &self,
        ledger: &mut Ledger,
        asset_id: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Transaction, CoreError> {
        Self::validate_order(asset_id, quantity, unit_price)?;

        let held = ledger
            .holdings
            .get(asset_id)
            .map(|h| h.quantity)
            .ok_or_else(|| CoreError::UnknownAsset(asset_id.to_string()))?;

        if quantity > held {
            return Err(CoreError::InsufficientHoldings {
                asset_id: asset_id.to_string(),
                requested: quantity,
                held,
            });
        }

        let gross = quantity * unit_price;
        let tax = gross * ledger.settings.sell_tax_rate;
        let net = gross - tax;

        ledger.cash_balance += net;

        if quantity >= held {
            // Full liquidation (oversells were rejected above). Absence
            // means no position, so drop the entry rather than keep a
            // zero-quantity holding.
            ledger.holdings.remove(asset_id);
        } else if let Some(holding) = ledger.holdings.get_mut(asset_id) {
            holding.quantity = held - quantity;
        }

        let transaction = Transaction {
            id: Uuid::new_v4(),
            asset_id: asset_id.to_string(),
            quantity,
            unit_price,
            kind: TransactionKind::Sell,
            timestamp: Self::next_timestamp(ledger),
            tax_withheld: Some(tax),
        };
        ledger.transactions.push(transaction.clone());
        Ok(transaction)
    }

    /// Wipe holdings and transaction log, restore cash to the configured
    /// starting amount. Total and irreversible; calling it twice yields
    /// the same state as calling it once.
    pub fn reset(&self, ledger: &mut Ledger) {
        ledger.cash_balance = ledger.settings.starting_cash;
        ledger.holdings.clear();
        ledger.transactions.clear();
    }

    /// Full copy of the current state, for persistence or display.
    #[must_use]
    pub fn snapshot(&self, ledger: &Ledger) -> Ledger {
        ledger.clone()
    }

    /// Replace the in-memory state with a previously captured snapshot.
    ///
    /// The snapshot is validated first; on `InvalidState` the prior
    /// in-memory state is retained unchanged.
    pub fn restore(&self, ledger: &mut Ledger, snapshot: Ledger) -> Result<(), CoreError> {
        Self::validate(&snapshot)?;
        *ledger = snapshot;
        Ok(())
    }

    /// Check every ledger invariant. Used before accepting a restored
    /// snapshot or a loaded file.
    pub fn validate(ledger: &Ledger) -> Result<(), CoreError> {
        if !ledger.cash_balance.is_finite() || ledger.cash_balance < 0.0 {
            return Err(CoreError::InvalidState(format!(
                "cash balance must be a non-negative finite number, got {}",
                ledger.cash_balance
            )));
        }

        for (asset_id, holding) in &ledger.holdings {
            if !holding.quantity.is_finite() || holding.quantity <= 0.0 {
                return Err(CoreError::InvalidState(format!(
                    "holding {asset_id} has non-positive quantity {} — zero positions must be absent",
                    holding.quantity
                )));
            }
            if !holding.average_cost.is_finite() || holding.average_cost < 0.0 {
                return Err(CoreError::InvalidState(format!(
                    "holding {asset_id} has invalid average cost {}",
                    holding.average_cost
                )));
            }
        }

        let mut seen_ids = HashSet::with_capacity(ledger.transactions.len());
        let mut last_timestamp: Option<DateTime<Utc>> = None;
        for tx in &ledger.transactions {
            if !seen_ids.insert(tx.id) {
                return Err(CoreError::InvalidState(format!(
                    "duplicate transaction id {}",
                    tx.id
                )));
            }
            if !tx.quantity.is_finite() || tx.quantity <= 0.0 {
                return Err(CoreError::InvalidState(format!(
                    "transaction {} has non-positive quantity {}",
                    tx.id, tx.quantity
                )));
            }
            if !tx.unit_price.is_finite() || tx.unit_price <= 0.0 {
                return Err(CoreError::InvalidState(format!(
                    "transaction {} has non-positive unit price {}",
                    tx.id, tx.unit_price
                )));
            }
            match (tx.kind, tx.tax_withheld) {
                (TransactionKind::Buy, Some(_)) => {
                    return Err(CoreError::InvalidState(format!(
                        "buy transaction {} carries withheld tax",
                        tx.id
                    )));
                }
                (TransactionKind::Sell, Some(tax)) if !tax.is_finite() || tax < 0.0 => {
                    return Err(CoreError::InvalidState(format!(
                        "sell transaction {} has invalid withheld tax {tax}",
                        tx.id
                    )));
                }
                _ => {}
            }
            if let Some(last) = last_timestamp {
                if tx.timestamp < last {
                    return Err(CoreError::InvalidState(format!(
                        "transaction log is not in chronological order at {}",
                        tx.id
                    )));
                }
            }
            last_timestamp = Some(tx.timestamp);
        }

        Ok(())
    }

    /// Reject non-positive or non-finite order parameters before any
    /// state is touched.
    fn validate_order(asset_id: &str, quantity: f64, unit_price: f64) -> Result<(), CoreError> {
        if asset_id.trim().is_empty() {
            return Err(CoreError::InvalidArgument(
                "asset id must not be empty".into(),
            ));
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(CoreError::InvalidArgument(format!(
                "quantity must be a positive finite number, got {quantity}"
            )));
        }
        if !unit_price.is_finite() || unit_price <= 0.0 {
            return Err(CoreError::InvalidArgument(format!(
                "unit price must be a positive finite number, got {unit_price}"
            )));
        }
        Ok(())
    }

    /// Timestamp for the next log entry. Clamped to the last entry's
    /// timestamp so the log stays non-decreasing even if the wall clock
    /// steps backwards.
    fn next_timestamp(ledger: &Ledger) -> DateTime<Utc> {
        let now = Utc::now();
        match ledger.transactions.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        }
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
