use crate::errors::CoreError;
use crate::models::valuation::PortfolioSummary;

/// Static exchange rates from USD, matching the display currencies the
/// app offers. A rate of r means 1 USD = r units of the currency.
const RATES: &[(&str, f64)] = &[("USD", 1.0), ("EUR", 0.91), ("PLN", 3.94)];

/// Converts valuation outputs from the base currency (USD) to a display
/// currency.
///
/// Display conversion only: the ledger stores and computes in USD, and
/// nothing here ever writes back to it. Percentages are dimensionless
/// and pass through unchanged.
pub struct CurrencyService;

impl CurrencyService {
    pub fn new() -> Self {
        Self
    }

    /// Currencies a rate is available for.
    #[must_use]
    pub fn supported_currencies(&self) -> Vec<&'static str> {
        RATES.iter().map(|(code, _)| *code).collect()
    }

    /// USD → `currency` rate, if the currency is supported.
    #[must_use]
    pub fn rate_for(&self, currency: &str) -> Option<f64> {
        let upper = currency.to_uppercase();
        RATES
            .iter()
            .find(|(code, _)| *code == upper)
            .map(|(_, rate)| *rate)
    }

    /// Convert a USD amount to the target currency.
    pub fn convert(&self, amount_usd: f64, currency: &str) -> Result<f64, CoreError> {
        let rate = self.rate_for(currency).ok_or_else(|| {
            CoreError::InvalidArgument(format!("unsupported display currency '{currency}'"))
        })?;
        Ok(amount_usd * rate)
    }

    /// Re-express every monetary field of a USD summary in the target
    /// currency. Quantities and percentages are untouched.
    pub fn convert_summary(
        &self,
        summary: &PortfolioSummary,
        currency: &str,
    ) -> Result<PortfolioSummary, CoreError> {
        let rate = self.rate_for(currency).ok_or_else(|| {
            CoreError::InvalidArgument(format!("unsupported display currency '{currency}'"))
        })?;

        let mut converted = summary.clone();
        converted.currency = currency.to_uppercase();
        converted.cash_balance *= rate;
        converted.holdings_value *= rate;
        converted.total_value *= rate;
        converted.total_unrealized_pnl *= rate;
        for position in &mut converted.positions {
            position.average_cost *= rate;
            position.valuation.market_value *= rate;
            position.valuation.unrealized_pnl *= rate;
        }
        Ok(converted)
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
