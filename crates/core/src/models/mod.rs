pub mod asset;
pub mod ledger;
pub mod quote;
pub mod settings;
pub mod transaction;
pub mod valuation;
