pub mod binance;
pub mod simulated;
pub mod traits;
