use crate::errors::CoreError;
use crate::models::ledger::Ledger;

/// The persistence contract the core requires from its environment.
///
/// The ledger engine is the sole writer and single-threaded, so the
/// only guarantee a store must provide is "last successful save wins
/// on the next load". `load` returns `None` on first run; the caller
/// then starts from a fresh default ledger.
pub trait LedgerStore {
    /// Durably persist the full ledger state.
    fn save(&self, ledger: &Ledger) -> Result<(), CoreError>;

    /// Retrieve the most recently saved state, or `None` if nothing
    /// has been saved yet.
    fn load(&self) -> Result<Option<Ledger>, CoreError>;
}
