pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use errors::CoreError;
use models::{
    ledger::{Holding, Ledger},
    quote::Quote,
    settings::Settings,
    transaction::{Transaction, TransactionKind, TransactionSortOrder},
    valuation::{AssetValuation, PortfolioSummary},
};
use providers::traits::PriceSource;
use services::{
    currency_service::CurrencyService, ledger_service::LedgerService,
    price_service::PriceService, valuation_service::ValuationService,
};
use storage::manager::StorageManager;
use storage::traits::LedgerStore;

/// Main entry point for the trading simulator core.
/// Owns the ledger state and all services needed to operate on it.
///
/// Single-writer, single-threaded by design: one logical actor drives
/// buys/sells/resets at a time. Price lookups happen here, *before* the
/// ledger engine is invoked, so the engine itself stays synchronous and
/// free of side effects beyond its own state.
#[must_use]
pub struct TradeSim {
    ledger: Ledger,
    ledger_service: LedgerService,
    valuation_service: ValuationService,
    currency_service: CurrencyService,
    price_service: PriceService,
    /// Tracks whether any mutation has occurred since the last save/load.
    dirty: bool,
}

impl std::fmt::Debug for TradeSim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeSim")
            .field("cash_balance", &self.ledger.cash_balance)
            .field("holdings", &self.ledger.holdings.len())
            .field("transactions", &self.ledger.transactions.len())
            .field("settings", &self.ledger.settings)
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl TradeSim {
    /// Create a brand new simulator with default settings:
    /// 10 000 starting cash, 2% sell tax, USD display.
    pub fn create_new() -> Self {
        Self::build(Ledger::default())
    }

    /// Create a simulator with custom settings (starting cash, tax rate,
    /// display currency are validated).
    pub fn with_settings(settings: Settings) -> Result<Self, CoreError> {
        Self::validate_settings(&settings)?;
        Ok(Self::build(Ledger::new(settings)))
    }

    /// Load an existing ledger from TSIM bytes.
    /// Use this where the frontend handles file I/O.
    pub fn load_from_bytes(data: &[u8]) -> Result<Self, CoreError> {
        let ledger = StorageManager::load_from_bytes(data)?;
        Ok(Self::build(ledger))
    }

    /// Save the current ledger to TSIM bytes.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_bytes(&mut self) -> Result<Vec<u8>, CoreError> {
        let bytes = StorageManager::save_to_bytes(&self.ledger)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Load from a ledger file on disk (native only, not WASM).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, CoreError> {
        let ledger = StorageManager::load_from_file(path)?;
        Ok(Self::build(ledger))
    }

    /// Save to a ledger file on disk (native only, not WASM).
    /// Clears the unsaved-changes flag on success.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to_file(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), CoreError> {
        StorageManager::save_to_file(&self.ledger, path)?;
        self.dirty = false;
        Ok(())
    }

    /// Load through a `LedgerStore`. Starts from a fresh default ledger
    /// when the store has nothing saved yet (first run).
    pub fn load_from_store(store: &dyn LedgerStore) -> Result<Self, CoreError> {
        match store.load()? {
            Some(ledger) => Ok(Self::build(ledger)),
            None => Ok(Self::create_new()),
        }
    }

    /// Save through a `LedgerStore`.
    /// Clears the unsaved-changes flag on success.
    pub fn save_to_store(&mut self, store: &dyn LedgerStore) -> Result<(), CoreError> {
        store.save(&self.ledger)?;
        self.dirty = false;
        Ok(())
    }

    // ── Trading ─────────────────────────────────────────────────────

    /// Buy `quantity` of an asset at an explicit unit price.
    pub fn buy(
        &mut self,
        asset_id: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Transaction, CoreError> {
        let tx = self
            .ledger_service
            .apply_buy(&mut self.ledger, asset_id, quantity, unit_price)?;
        self.dirty = true;
        Ok(tx)
    }

    /// Sell `quantity` of an asset at an explicit unit price.
    /// The configured tax rate is withheld from the proceeds.
    pub fn sell(
        &mut self,
        asset_id: &str,
        quantity: f64,
        unit_price: f64,
    ) -> Result<Transaction, CoreError> {
        let tx = self
            .ledger_service
            .apply_sell(&mut self.ledger, asset_id, quantity, unit_price)?;
        self.dirty = true;
        Ok(tx)
    }

    /// Buy at the current market price from the configured price sources.
    pub async fn buy_at_market(
        &mut self,
        asset_id: &str,
        quantity: f64,
    ) -> Result<Transaction, CoreError> {
        let price = self.price_service.get_price(asset_id).await?;
        self.buy(asset_id, quantity, price)
    }

    /// Sell at the current market price from the configured price sources.
    pub async fn sell_at_market(
        &mut self,
        asset_id: &str,
        quantity: f64,
    ) -> Result<Transaction, CoreError> {
        let price = self.price_service.get_price(asset_id).await?;
        self.sell(asset_id, quantity, price)
    }

    /// Wipe all positions and history and restore the starting cash.
    pub fn reset(&mut self) {
        self.ledger_service.reset(&mut self.ledger);
        self.dirty = true;
    }

    /// Full copy of the current ledger state.
    #[must_use]
    pub fn snapshot(&self) -> Ledger {
        self.ledger_service.snapshot(&self.ledger)
    }

    /// Replace the ledger with a previously captured snapshot.
    /// Rejected atomically with `InvalidState` if the snapshot violates
    /// an invariant; the current state is kept in that case.
    pub fn restore(&mut self, snapshot: Ledger) -> Result<(), CoreError> {
        self.ledger_service.restore(&mut self.ledger, snapshot)?;
        self.dirty = true;
        Ok(())
    }

    // ── Ledger Queries ──────────────────────────────────────────────

    /// Current virtual cash in the base currency.
    #[must_use]
    pub fn cash_balance(&self) -> f64 {
        self.ledger.cash_balance
    }

    /// All current positions, keyed by asset id.
    #[must_use]
    pub fn holdings(&self) -> &HashMap<String, Holding> {
        &self.ledger.holdings
    }

    /// The position in one asset, if any.
    #[must_use]
    pub fn holding(&self, asset_id: &str) -> Option<&Holding> {
        self.ledger.holdings.get(asset_id)
    }

    /// All transactions, newest first.
    #[must_use]
    pub fn transactions(&self) -> Vec<&Transaction> {
        let mut txs: Vec<&Transaction> = self.ledger.transactions.iter().collect();
        txs.reverse(); // internal log is oldest-first; reverse for display
        txs
    }

    /// Transactions for one asset, newest first.
    #[must_use]
    pub fn transactions_for_asset(&self, asset_id: &str) -> Vec<&Transaction> {
        let mut txs: Vec<&Transaction> = self
            .ledger
            .transactions
            .iter()
            .filter(|t| t.asset_id == asset_id)
            .collect();
        txs.reverse();
        txs
    }

    /// Transactions of one kind (Buy or Sell), newest first.
    #[must_use]
    pub fn transactions_by_kind(&self, kind: TransactionKind) -> Vec<&Transaction> {
        let mut txs: Vec<&Transaction> = self
            .ledger
            .transactions
            .iter()
            .filter(|t| t.kind == kind)
            .collect();
        txs.reverse();
        txs
    }

    /// Transactions within a time range (inclusive), newest first.
    #[must_use]
    pub fn transactions_in_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<&Transaction> {
        let mut txs: Vec<&Transaction> = self
            .ledger
            .transactions
            .iter()
            .filter(|t| t.timestamp >= from && t.timestamp <= to)
            .collect();
        txs.reverse();
        txs
    }

    /// Transactions sorted by a specific order.
    #[must_use]
    pub fn transactions_sorted(&self, order: &TransactionSortOrder) -> Vec<&Transaction> {
        let mut txs: Vec<&Transaction> = self.ledger.transactions.iter().collect();
        match order {
            TransactionSortOrder::TimeDesc => txs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
            TransactionSortOrder::TimeAsc => txs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
            TransactionSortOrder::ValueDesc => txs.sort_by(|a, b| {
                b.gross_value()
                    .partial_cmp(&a.gross_value())
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            TransactionSortOrder::ValueAsc => txs.sort_by(|a, b| {
                a.gross_value()
                    .partial_cmp(&b.gross_value())
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            TransactionSortOrder::AssetAsc => txs.sort_by(|a, b| a.asset_id.cmp(&b.asset_id)),
            TransactionSortOrder::AssetDesc => txs.sort_by(|a, b| b.asset_id.cmp(&a.asset_id)),
        }
        txs
    }

    /// Total number of transactions without materializing a sorted vector.
    #[must_use]
    pub fn transaction_count(&self) -> usize {
        self.ledger.transactions.len()
    }

    /// Total tax withheld across all sells.
    #[must_use]
    pub fn total_tax_withheld(&self) -> f64 {
        self.ledger
            .transactions
            .iter()
            .filter_map(|t| t.tax_withheld)
            .sum()
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Value current holdings against caller-supplied prices (base
    /// currency). Missing prices are soft misses, valued at zero.
    #[must_use]
    pub fn valuation(&self, prices: &HashMap<String, f64>) -> HashMap<String, AssetValuation> {
        self.valuation_service
            .compute_valuation(&self.ledger.holdings, prices)
    }

    /// Cash plus market value of all positions at the supplied prices.
    #[must_use]
    pub fn total_value(&self, prices: &HashMap<String, f64>) -> f64 {
        let valuations = self.valuation(prices);
        self.valuation_service
            .compute_total_value(self.ledger.cash_balance, &valuations)
    }

    /// Full portfolio summary at current market prices, expressed in
    /// the display currency. A source failure for one asset is a soft
    /// miss (that position is valued at zero), not an error.
    pub async fn portfolio_summary(&self) -> Result<PortfolioSummary, CoreError> {
        let prices = self.fetch_held_prices().await;
        let summary = self
            .valuation_service
            .portfolio_summary(&self.ledger, &prices);
        self.currency_service
            .convert_summary(&summary, &self.ledger.settings.display_currency)
    }

    // ── Market Data ─────────────────────────────────────────────────

    /// Current market listing for the built-in catalog, with prices
    /// converted to the display currency.
    pub async fn market_quotes(&self) -> Result<Vec<Quote>, CoreError> {
        let mut quotes = self.price_service.get_quotes().await?;
        let rate = self
            .currency_service
            .rate_for(&self.ledger.settings.display_currency)
            .unwrap_or(1.0);
        for quote in &mut quotes {
            quote.price *= rate;
        }
        Ok(quotes)
    }

    /// Current price of one asset in the base currency.
    pub async fn market_price(&self, asset_id: &str) -> Result<f64, CoreError> {
        self.price_service.get_price(asset_id).await
    }

    /// Replace the price source chain (e.g., simulated-only for demos,
    /// mocks in tests).
    pub fn set_price_sources(&mut self, sources: Vec<Box<dyn PriceSource>>) {
        self.price_service = PriceService::new(sources);
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.ledger.settings
    }

    /// Set the display currency. Must be a supported 3-letter code.
    /// Display-only: the stored ledger is never converted.
    pub fn set_display_currency(&mut self, currency: &str) -> Result<(), CoreError> {
        let upper = currency.trim().to_uppercase();
        if self.currency_service.rate_for(&upper).is_none() {
            return Err(CoreError::InvalidArgument(format!(
                "unsupported display currency '{currency}' (supported: {})",
                self.currency_service.supported_currencies().join(", ")
            )));
        }
        self.ledger.settings.display_currency = upper;
        self.dirty = true;
        Ok(())
    }

    /// Set the cash amount future resets restore. Does not touch the
    /// current balance.
    pub fn set_starting_cash(&mut self, amount: f64) -> Result<(), CoreError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(CoreError::InvalidArgument(format!(
                "starting cash must be a non-negative finite number, got {amount}"
            )));
        }
        self.ledger.settings.starting_cash = amount;
        self.dirty = true;
        Ok(())
    }

    /// Set the flat tax rate withheld from future sells. Must be in
    /// `[0, 1)`.
    pub fn set_sell_tax_rate(&mut self, rate: f64) -> Result<(), CoreError> {
        if !rate.is_finite() || !(0.0..1.0).contains(&rate) {
            return Err(CoreError::InvalidArgument(format!(
                "sell tax rate must be in [0, 1), got {rate}"
            )));
        }
        self.ledger.settings.sell_tax_rate = rate;
        self.dirty = true;
        Ok(())
    }

    /// Returns `true` if the ledger has been modified since the last
    /// save or load.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.dirty
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the transaction log as a JSON string (oldest first).
    pub fn export_transactions_to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.ledger.transactions)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize transactions: {e}")))
    }

    /// Export the transaction log as a CSV string (oldest first).
    /// Columns: id, kind, asset_id, quantity, unit_price, gross_value,
    /// tax_withheld, timestamp
    #[must_use]
    pub fn export_transactions_to_csv(&self) -> String {
        let mut csv =
            String::from("id,kind,asset_id,quantity,unit_price,gross_value,tax_withheld,timestamp\n");
        for tx in &self.ledger.transactions {
            let tax = tx
                .tax_withheld
                .map(|t| t.to_string())
                .unwrap_or_default();
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                tx.id,
                tx.kind,
                tx.asset_id,
                tx.quantity,
                tx.unit_price,
                tx.gross_value(),
                tax,
                tx.timestamp.to_rfc3339(),
            ));
        }
        csv
    }

    /// Export the full ledger as JSON (unencrypted snapshot for
    /// debugging/display).
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.ledger)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize ledger: {e}")))
    }

    /// Import a full ledger snapshot from JSON. Validated like any
    /// restore; the current state is kept if the snapshot is invalid.
    pub fn import_snapshot_json(&mut self, json: &str) -> Result<(), CoreError> {
        let snapshot: Ledger = serde_json::from_str(json)?;
        self.restore(snapshot)
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Fetch current prices for every held asset. Fetch failures are
    /// soft misses — the asset is simply absent from the returned map.
    async fn fetch_held_prices(&self) -> HashMap<String, f64> {
        let mut prices = HashMap::with_capacity(self.ledger.holdings.len());
        for asset_id in self.ledger.holdings.keys() {
            if let Ok(price) = self.price_service.get_price(asset_id).await {
                prices.insert(asset_id.clone(), price);
            }
        }
        prices
    }

    fn validate_settings(settings: &Settings) -> Result<(), CoreError> {
        if !settings.starting_cash.is_finite() || settings.starting_cash < 0.0 {
            return Err(CoreError::InvalidArgument(format!(
                "starting cash must be a non-negative finite number, got {}",
                settings.starting_cash
            )));
        }
        if !settings.sell_tax_rate.is_finite() || !(0.0..1.0).contains(&settings.sell_tax_rate) {
            return Err(CoreError::InvalidArgument(format!(
                "sell tax rate must be in [0, 1), got {}",
                settings.sell_tax_rate
            )));
        }
        if CurrencyService::new()
            .rate_for(&settings.display_currency)
            .is_none()
        {
            return Err(CoreError::InvalidArgument(format!(
                "unsupported display currency '{}'",
                settings.display_currency
            )));
        }
        Ok(())
    }

    fn build(ledger: Ledger) -> Self {
        Self {
            ledger,
            ledger_service: LedgerService::new(),
            valuation_service: ValuationService::new(),
            currency_service: CurrencyService::new(),
            price_service: PriceService::with_defaults(),
            dirty: false,
        }
    }
}
