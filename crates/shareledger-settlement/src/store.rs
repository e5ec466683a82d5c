//! Ledger store contract.
//!
//! The engine never touches a database directly. The host application
//! implements these traits over its relational store; [`crate::InMemoryLedger`]
//! is the reference implementation used in tests.

use shareledger_types::{
    Participant, Result, SettlementId, SettlementPayment, SettlementState, SharedExpense,
};

/// Read side of the ledger.
pub trait LedgerReader {
    /// All known identities; seeds the zero balances.
    fn list_participants(&self) -> Result<Vec<Participant>>;

    /// Shared expenses whose status makes them count toward settlements.
    fn list_eligible_shared_expenses(&self) -> Result<Vec<SharedExpense>>;

    /// Settlement payments in the given lifecycle state.
    fn list_settlement_payments(&self, state: SettlementState) -> Result<Vec<SettlementPayment>>;

    fn list_all_settlement_payments(&self) -> Result<Vec<SettlementPayment>>;

    fn get_settlement_payment(&self, id: SettlementId) -> Result<Option<SettlementPayment>>;
}

/// Write side of the settlement table.
pub trait SettlementWriter {
    /// Insert `record` when its id is `None` (a fresh id is assigned),
    /// otherwise overwrite the row with that id. Returns the stored row.
    ///
    /// # Errors
    /// [`shareledger_types::LedgerError::DataAccess`] if the write fails or
    /// the id does not exist.
    fn upsert_settlement_payment(&mut self, record: SettlementPayment) -> Result<SettlementPayment>;
}

/// A store that can run a closure as one atomic transaction.
pub trait LedgerStore: LedgerReader + SettlementWriter {
    /// Run `f` against this store. If `f` returns `Err`, every write it made
    /// is discarded and the store is left exactly as before.
    fn atomically<T, F>(&mut self, f: F) -> Result<T>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<T>;
}

/// Everything the balance calculator needs, read in one go.
#[derive(Debug, Clone, Default)]
pub struct LedgerSnapshot {
    pub participants: Vec<Participant>,
    pub expenses: Vec<SharedExpense>,
    pub paid: Vec<SettlementPayment>,
}

impl LedgerSnapshot {
    /// Read a snapshot through `reader`.
    pub fn read<R: LedgerReader + ?Sized>(reader: &R) -> Result<Self> {
        Ok(Self {
            participants: reader.list_participants()?,
            expenses: reader.list_eligible_shared_expenses()?,
            paid: reader.list_settlement_payments(SettlementState::Paid)?,
        })
    }
}
