//! In-memory ledger store.
//!
//! Holds participants, shared expenses, and settlement rows in ordered maps.
//! Transactions snapshot the whole state up front and restore it if the
//! closure fails, which gives the same all-or-nothing behaviour a relational
//! store provides. Fault injection lets tests force a write to fail midway.

use std::collections::BTreeMap;

use shareledger_types::{
    ExpenseId, LedgerError, Participant, ParticipantId, Result, SettlementId, SettlementPayment,
    SettlementState, SharedExpense,
};

use crate::store::{LedgerReader, LedgerStore, SettlementWriter};

#[derive(Debug, Clone, Default)]
struct LedgerState {
    participants: BTreeMap<ParticipantId, Participant>,
    expenses: BTreeMap<ExpenseId, SharedExpense>,
    settlements: BTreeMap<SettlementId, SettlementPayment>,
    /// Last id handed out; the next insert gets `last_id.next()`.
    last_id: SettlementId,
}

/// Reference [`LedgerStore`] backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    state: LedgerState,
    /// Remaining writes allowed before upserts start failing.
    write_budget: Option<usize>,
    /// Settlement writes that reached the table (rolled-back ones included).
    writes: usize,
}

impl InMemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a participant (user directory side).
    pub fn add_participant(&mut self, participant: Participant) {
        self.state.participants.insert(participant.id, participant);
    }

    /// Create or replace a shared expense (expense-management side).
    pub fn put_expense(&mut self, expense: SharedExpense) {
        self.state.expenses.insert(expense.id, expense);
    }

    /// Delete a shared expense. Returns the removed record, if any.
    pub fn remove_expense(&mut self, id: ExpenseId) -> Option<SharedExpense> {
        self.state.expenses.remove(&id)
    }

    /// Record a settlement row written outside the engine (the payments
    /// side recording a PAID transfer). A fresh id is always assigned and
    /// injected write faults do not apply.
    pub fn insert_settlement(&mut self, mut record: SettlementPayment) -> SettlementPayment {
        let id = self.state.last_id.next();
        self.state.last_id = id;
        record.id = Some(id);
        self.state.settlements.insert(id, record.clone());
        record
    }

    /// Allow `n` more successful settlement writes, then fail every write
    /// with [`LedgerError::DataAccess`].
    pub fn fail_writes_after(&mut self, n: usize) {
        self.write_budget = Some(n);
    }

    /// Remove any injected write failure.
    pub fn clear_faults(&mut self) {
        self.write_budget = None;
    }

    /// Total settlement writes performed so far.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Number of settlement rows in any state.
    #[must_use]
    pub fn settlement_count(&self) -> usize {
        self.state.settlements.len()
    }
}

impl LedgerReader for InMemoryLedger {
    fn list_participants(&self) -> Result<Vec<Participant>> {
        Ok(self.state.participants.values().cloned().collect())
    }

    fn list_eligible_shared_expenses(&self) -> Result<Vec<SharedExpense>> {
        Ok(self
            .state
            .expenses
            .values()
            .filter(|e| e.is_eligible())
            .cloned()
            .collect())
    }

    fn list_settlement_payments(&self, state: SettlementState) -> Result<Vec<SettlementPayment>> {
        Ok(self
            .state
            .settlements
            .values()
            .filter(|s| s.state == state)
            .cloned()
            .collect())
    }

    fn list_all_settlement_payments(&self) -> Result<Vec<SettlementPayment>> {
        Ok(self.state.settlements.values().cloned().collect())
    }

    fn get_settlement_payment(&self, id: SettlementId) -> Result<Option<SettlementPayment>> {
        Ok(self.state.settlements.get(&id).cloned())
    }
}

impl SettlementWriter for InMemoryLedger {
    fn upsert_settlement_payment(&mut self, mut record: SettlementPayment) -> Result<SettlementPayment> {
        if let Some(budget) = self.write_budget.as_mut() {
            if *budget == 0 {
                return Err(LedgerError::data_access("injected write failure"));
            }
            *budget -= 1;
        }

        let id = match record.id {
            Some(id) if self.state.settlements.contains_key(&id) => id,
            Some(id) => {
                return Err(LedgerError::data_access(format!(
                    "cannot update missing row {id}"
                )));
            }
            None => {
                self.state.last_id = self.state.last_id.next();
                self.state.last_id
            }
        };

        record.id = Some(id);
        self.state.settlements.insert(id, record.clone());
        self.writes += 1;
        Ok(record)
    }
}

impl LedgerStore for InMemoryLedger {
    fn atomically<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Self) -> Result<T>,
    {
        let before = self.state.clone();
        match f(self) {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::warn!(error = %err, "Transaction rolled back");
                self.state = before;
                Err(err)
            }
        }
    }
}
