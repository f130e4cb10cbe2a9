// ═══════════════════════════════════════════════════════════════════
// Integration Tests — the TradeSim facade end to end
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::HashMap;

use trade_sim_core::errors::CoreError;
use trade_sim_core::models::quote::Quote;
use trade_sim_core::models::settings::Settings;
use trade_sim_core::models::transaction::{TransactionKind, TransactionSortOrder};
use trade_sim_core::providers::traits::PriceSource;
use trade_sim_core::storage::manager::FileStore;
use trade_sim_core::TradeSim;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// ═══════════════════════════════════════════════════════════════════
// Mock Price Source (fixed price table, no network)
// ═══════════════════════════════════════════════════════════════════

struct TableSource {
    prices: HashMap<String, f64>,
}

impl TableSource {
    fn new(entries: &[(&str, f64)]) -> Self {
        Self {
            prices: entries
                .iter()
                .map(|(id, price)| (id.to_string(), *price))
                .collect(),
        }
    }
}

#[async_trait]
impl PriceSource for TableSource {
    fn name(&self) -> &str {
        "Table"
    }

    async fn get_price(&self, asset_id: &str) -> Result<f64, CoreError> {
        self.prices
            .get(asset_id)
            .copied()
            .ok_or_else(|| CoreError::PriceNotAvailable(asset_id.to_string()))
    }

    async fn get_quotes(&self) -> Result<Vec<Quote>, CoreError> {
        Ok(trade_sim_core::models::asset::catalog()
            .into_iter()
            .filter_map(|asset| {
                let price = self.prices.get(&asset.id).copied()?;
                Some(Quote {
                    asset,
                    price,
                    change_pct_24h: 0.0,
                })
            })
            .collect())
    }
}

fn sim_with_prices(entries: &[(&str, f64)]) -> TradeSim {
    let mut sim = TradeSim::create_new();
    sim.set_price_sources(vec![Box::new(TableSource::new(entries))]);
    sim
}

// ═══════════════════════════════════════════════════════════════════
// Construction & settings
// ═══════════════════════════════════════════════════════════════════

mod setup {
    use super::*;

    #[test]
    fn fresh_sim_has_default_state() {
        let sim = TradeSim::create_new();
        assert_close(sim.cash_balance(), 10_000.0);
        assert!(sim.holdings().is_empty());
        assert_eq!(sim.transaction_count(), 0);
        assert!(!sim.has_unsaved_changes());
    }

    #[test]
    fn custom_settings_are_applied() {
        let sim = TradeSim::with_settings(Settings {
            starting_cash: 50_000.0,
            sell_tax_rate: 0.05,
            display_currency: "EUR".to_string(),
        })
        .unwrap();
        assert_close(sim.cash_balance(), 50_000.0);
        assert_eq!(sim.settings().display_currency, "EUR");
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(TradeSim::with_settings(Settings {
            starting_cash: -1.0,
            ..Settings::default()
        })
        .is_err());
        assert!(TradeSim::with_settings(Settings {
            sell_tax_rate: 1.0,
            ..Settings::default()
        })
        .is_err());
        assert!(TradeSim::with_settings(Settings {
            display_currency: "XYZ".to_string(),
            ..Settings::default()
        })
        .is_err());
    }

    #[test]
    fn settings_setters_validate_and_mark_dirty() {
        let mut sim = TradeSim::create_new();

        sim.set_display_currency("pln").unwrap();
        assert_eq!(sim.settings().display_currency, "PLN");
        assert!(sim.has_unsaved_changes());

        assert!(sim.set_display_currency("GBP").is_err());
        assert!(sim.set_starting_cash(f64::NAN).is_err());
        assert!(sim.set_sell_tax_rate(-0.1).is_err());
        assert!(sim.set_sell_tax_rate(1.0).is_err());

        sim.set_sell_tax_rate(0.0).unwrap();
        sim.set_starting_cash(500.0).unwrap();
        assert_close(sim.settings().starting_cash, 500.0);
        // current balance is untouched until the next reset
        assert_close(sim.cash_balance(), 10_000.0);
        sim.reset();
        assert_close(sim.cash_balance(), 500.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Trading through the facade
// ═══════════════════════════════════════════════════════════════════

mod trading {
    use super::*;

    #[test]
    fn buy_and_sell_update_ledger_and_dirty_flag() {
        let mut sim = TradeSim::create_new();

        let tx = sim.buy("bitcoin", 2.0, 100.0).unwrap();
        assert_eq!(tx.kind, TransactionKind::Buy);
        assert_close(sim.cash_balance(), 9_800.0);
        assert!(sim.has_unsaved_changes());

        let tx = sim.sell("bitcoin", 1.0, 150.0).unwrap();
        assert_close(tx.tax_withheld.unwrap(), 3.0);
        assert_close(sim.cash_balance(), 9_947.0);

        let holding = sim.holding("bitcoin").unwrap();
        assert_close(holding.quantity, 1.0);
        assert_close(holding.average_cost, 100.0);
    }

    #[test]
    fn failed_trade_does_not_mark_dirty() {
        let mut sim = TradeSim::create_new();
        assert!(sim.buy("bitcoin", 1.0, 20_000.0).is_err());
        assert!(!sim.has_unsaved_changes());
    }

    #[tokio::test]
    async fn market_orders_use_the_price_source() {
        let mut sim = sim_with_prices(&[("bitcoin", 200.0)]);

        let tx = sim.buy_at_market("bitcoin", 2.0).await.unwrap();
        assert_close(tx.unit_price, 200.0);
        assert_close(sim.cash_balance(), 9_600.0);

        let tx = sim.sell_at_market("bitcoin", 2.0).await.unwrap();
        assert_close(tx.unit_price, 200.0);
        // gross 400, tax 8, net 392
        assert_close(sim.cash_balance(), 9_992.0);
        assert!(sim.holding("bitcoin").is_none());
    }

    #[tokio::test]
    async fn market_order_for_unpriced_asset_fails_cleanly() {
        let mut sim = sim_with_prices(&[("bitcoin", 200.0)]);
        let err = sim.buy_at_market("ethereum", 1.0).await.unwrap_err();
        assert!(matches!(err, CoreError::PriceNotAvailable(_)));
        assert_close(sim.cash_balance(), 10_000.0);
    }

    #[test]
    fn total_tax_accumulates_over_sells() {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 10.0, 100.0).unwrap();
        sim.sell("bitcoin", 5.0, 100.0).unwrap(); // tax 10
        sim.sell("bitcoin", 5.0, 100.0).unwrap(); // tax 10
        assert_close(sim.total_tax_withheld(), 20.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Transaction queries
// ═══════════════════════════════════════════════════════════════════

mod history {
    use super::*;

    fn populated() -> TradeSim {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 1.0, 100.0).unwrap();
        sim.buy("ethereum", 2.0, 50.0).unwrap();
        sim.sell("bitcoin", 0.5, 120.0).unwrap();
        sim
    }

    #[test]
    fn listing_is_newest_first() {
        let sim = populated();
        let txs = sim.transactions();
        assert_eq!(txs.len(), 3);
        assert_eq!(txs[0].kind, TransactionKind::Sell);
        assert_eq!(txs[2].asset_id, "bitcoin");
        for pair in txs.windows(2) {
            assert!(pair[0].timestamp >= pair[1].timestamp);
        }
    }

    #[test]
    fn filters_by_asset_and_kind() {
        let sim = populated();
        assert_eq!(sim.transactions_for_asset("bitcoin").len(), 2);
        assert_eq!(sim.transactions_for_asset("ethereum").len(), 1);
        assert_eq!(sim.transactions_by_kind(TransactionKind::Buy).len(), 2);
        assert_eq!(sim.transactions_by_kind(TransactionKind::Sell).len(), 1);
    }

    #[test]
    fn range_filter_is_inclusive() {
        let sim = populated();
        let all = sim.transactions();
        let from = all.last().unwrap().timestamp;
        let to = all.first().unwrap().timestamp;
        assert_eq!(sim.transactions_in_range(from, to).len(), 3);

        let none = sim.transactions_in_range(to + chrono::Duration::hours(1), to + chrono::Duration::hours(2));
        assert!(none.is_empty());
    }

    #[test]
    fn sort_orders() {
        let sim = populated();

        let by_value = sim.transactions_sorted(&TransactionSortOrder::ValueDesc);
        // gross values: 100 (buy btc), 100 (buy eth), 60 (sell btc)
        assert_close(by_value[0].gross_value(), 100.0);
        assert_close(by_value[2].gross_value(), 60.0);

        let by_asset = sim.transactions_sorted(&TransactionSortOrder::AssetAsc);
        assert_eq!(by_asset[0].asset_id, "bitcoin");
        assert_eq!(by_asset[2].asset_id, "ethereum");

        let by_time = sim.transactions_sorted(&TransactionSortOrder::TimeAsc);
        assert_eq!(by_time[0].kind, TransactionKind::Buy);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Valuation & market data
// ═══════════════════════════════════════════════════════════════════

mod valuation {
    use super::*;

    #[test]
    fn valuation_with_explicit_prices() {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 2.0, 100.0).unwrap();

        let prices = HashMap::from([("bitcoin".to_string(), 150.0)]);
        let valuations = sim.valuation(&prices);
        let v = valuations.get("bitcoin").unwrap();
        assert_close(v.market_value, 300.0);
        assert_close(v.unrealized_pnl, 100.0);
        assert_close(v.unrealized_pnl_pct, 50.0);

        assert_close(sim.total_value(&prices), 9_800.0 + 300.0);
    }

    #[tokio::test]
    async fn summary_fetches_prices_and_converts_currency() {
        let mut sim = sim_with_prices(&[("bitcoin", 150.0)]);
        sim.buy("bitcoin", 2.0, 100.0).unwrap();

        let usd = sim.portfolio_summary().await.unwrap();
        assert_eq!(usd.currency, "USD");
        assert_close(usd.holdings_value, 300.0);
        assert_close(usd.total_value, 9_800.0 + 300.0);

        sim.set_display_currency("EUR").unwrap();
        let eur = sim.portfolio_summary().await.unwrap();
        assert_eq!(eur.currency, "EUR");
        assert_close(eur.total_value, (9_800.0 + 300.0) * 0.91);
        // display conversion never touches the stored ledger
        assert_close(sim.cash_balance(), 9_800.0);
    }

    #[tokio::test]
    async fn summary_treats_fetch_failure_as_soft_miss() {
        let mut sim = sim_with_prices(&[("bitcoin", 150.0)]);
        sim.buy("bitcoin", 1.0, 100.0).unwrap();
        sim.buy("ethereum", 1.0, 50.0).unwrap(); // no price in the table

        let summary = sim.portfolio_summary().await.unwrap();
        let eth = summary
            .positions
            .iter()
            .find(|p| p.asset_id == "ethereum")
            .unwrap();
        assert_close(eth.valuation.market_value, 0.0);
        assert_close(summary.holdings_value, 150.0);
    }

    #[tokio::test]
    async fn market_quotes_are_converted_for_display() {
        let mut sim = sim_with_prices(&[("bitcoin", 100.0), ("ethereum", 10.0)]);

        let usd = sim.market_quotes().await.unwrap();
        let btc = usd.iter().find(|q| q.asset.id == "bitcoin").unwrap();
        assert_close(btc.price, 100.0);

        sim.set_display_currency("PLN").unwrap();
        let pln = sim.market_quotes().await.unwrap();
        let btc = pln.iter().find(|q| q.asset.id == "bitcoin").unwrap();
        assert_close(btc.price, 394.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Persistence & snapshots through the facade
// ═══════════════════════════════════════════════════════════════════

mod persistence {
    use super::*;

    #[test]
    fn bytes_round_trip_restores_everything() {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 0.1, 60_000.0).unwrap();
        sim.sell("bitcoin", 0.05, 65_000.0).unwrap();
        sim.set_display_currency("PLN").unwrap();

        let bytes = sim.save_to_bytes().unwrap();
        assert!(!sim.has_unsaved_changes());

        let loaded = TradeSim::load_from_bytes(&bytes).unwrap();
        assert_eq!(loaded.snapshot(), sim.snapshot());
        assert!(!loaded.has_unsaved_changes());
        assert_eq!(loaded.settings().display_currency, "PLN");
    }

    #[test]
    fn store_round_trip_and_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("sim.tsim"));

        // first run: nothing saved yet, start fresh
        let mut sim = TradeSim::load_from_store(&store).unwrap();
        assert_close(sim.cash_balance(), 10_000.0);

        sim.buy("ethereum", 1.0, 3_000.0).unwrap();
        sim.save_to_store(&store).unwrap();
        assert!(!sim.has_unsaved_changes());

        let reloaded = TradeSim::load_from_store(&store).unwrap();
        assert_eq!(reloaded.snapshot(), sim.snapshot());
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 1.0, 100.0).unwrap();
        let snapshot = sim.snapshot();

        sim.sell("bitcoin", 1.0, 200.0).unwrap();
        sim.restore(snapshot.clone()).unwrap();
        assert_eq!(sim.snapshot(), snapshot);
    }

    #[test]
    fn restore_rejects_corrupt_snapshot_and_keeps_state() {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 1.0, 100.0).unwrap();
        let before = sim.snapshot();

        let mut bad = before.clone();
        bad.cash_balance = f64::NAN;
        assert!(matches!(sim.restore(bad), Err(CoreError::InvalidState(_))));
        assert_eq!(sim.snapshot(), before);
    }

    #[test]
    fn json_snapshot_export_import() {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 0.1, 60_000.0).unwrap();

        let json = sim.to_json().unwrap();
        let mut other = TradeSim::create_new();
        other.import_snapshot_json(&json).unwrap();
        assert_eq!(other.snapshot(), sim.snapshot());
    }

    #[test]
    fn reset_clears_everything_and_marks_dirty() {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 1.0, 100.0).unwrap();
        let _ = sim.save_to_bytes().unwrap();
        assert!(!sim.has_unsaved_changes());

        sim.reset();
        assert!(sim.has_unsaved_changes());
        assert_close(sim.cash_balance(), 10_000.0);
        assert_eq!(sim.transaction_count(), 0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Export
// ═══════════════════════════════════════════════════════════════════

mod export {
    use super::*;

    #[test]
    fn json_export_contains_all_transactions() {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 1.0, 100.0).unwrap();
        sim.sell("bitcoin", 1.0, 150.0).unwrap();

        let json = sim.export_transactions_to_json().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 2);
        assert_eq!(parsed[0]["kind"], "Buy");
        assert_eq!(parsed[1]["kind"], "Sell");
    }

    #[test]
    fn csv_export_has_header_and_rows() {
        let mut sim = TradeSim::create_new();
        sim.buy("bitcoin", 2.0, 100.0).unwrap();
        sim.sell("bitcoin", 1.0, 150.0).unwrap();

        let csv = sim.export_transactions_to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "id,kind,asset_id,quantity,unit_price,gross_value,tax_withheld,timestamp"
        );
        assert!(lines[1].contains(",Buy,bitcoin,2,100,200,,"));
        assert!(lines[2].contains(",Sell,bitcoin,1,150,150,3,"));
    }

    #[test]
    fn empty_ledger_exports_header_only_csv() {
        let sim = TradeSim::create_new();
        let csv = sim.export_transactions_to_csv();
        assert_eq!(csv.lines().count(), 1);
    }
}
