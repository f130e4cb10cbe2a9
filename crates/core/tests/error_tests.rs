// ═══════════════════════════════════════════════════════════════════
// Error Tests — CoreError display formats and From conversions
// ═══════════════════════════════════════════════════════════════════

use trade_sim_core::errors::CoreError;

mod display {
    use super::*;

    #[test]
    fn invalid_argument() {
        let e = CoreError::InvalidArgument("quantity must be positive".into());
        assert_eq!(e.to_string(), "Invalid argument: quantity must be positive");
    }

    #[test]
    fn insufficient_funds_shows_amounts() {
        let e = CoreError::InsufficientFunds {
            required: 6_000.0,
            available: 5_000.0,
        };
        assert_eq!(
            e.to_string(),
            "Insufficient funds: need 6000.00, have 5000.00"
        );
    }

    #[test]
    fn unknown_asset_names_the_asset() {
        let e = CoreError::UnknownAsset("bitcoin".into());
        assert_eq!(e.to_string(), "No holding for asset: bitcoin");
    }

    #[test]
    fn insufficient_holdings_shows_quantities() {
        let e = CoreError::InsufficientHoldings {
            asset_id: "ethereum".into(),
            requested: 5.0,
            held: 2.0,
        };
        assert_eq!(
            e.to_string(),
            "Insufficient holdings of ethereum: tried to sell 5, hold 2"
        );
    }

    #[test]
    fn invalid_state() {
        let e = CoreError::InvalidState("duplicate transaction id".into());
        assert_eq!(e.to_string(), "Invalid ledger state: duplicate transaction id");
    }

    #[test]
    fn unsupported_version_carries_version() {
        let e = CoreError::UnsupportedVersion(7);
        assert_eq!(e.to_string(), "Unsupported file version: 7");
    }

    #[test]
    fn api_error_names_the_provider() {
        let e = CoreError::Api {
            provider: "Binance".into(),
            message: "HTTP 429".into(),
        };
        assert_eq!(e.to_string(), "API error (Binance): HTTP 429");
    }

    #[test]
    fn price_not_available_names_the_asset() {
        let e = CoreError::PriceNotAvailable("unknown-coin".into());
        assert_eq!(e.to_string(), "Price not available for asset: unknown-coin");
    }
}

mod conversions {
    use super::*;

    #[test]
    fn io_error_becomes_file_io() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let e: CoreError = io.into();
        assert!(matches!(e, CoreError::FileIO(_)));
        assert!(e.to_string().contains("no such file"));
    }

    #[test]
    fn serde_json_error_becomes_deserialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: CoreError = json_err.into();
        assert!(matches!(e, CoreError::Deserialization(_)));
    }

    #[test]
    fn bincode_error_becomes_serialization() {
        let bin_err =
            bincode::deserialize::<trade_sim_core::models::ledger::Ledger>(&[0xFF]).unwrap_err();
        let e: CoreError = bin_err.into();
        assert!(matches!(e, CoreError::Serialization(_)));
    }
}
