//! # shareledger-settlement
//!
//! **Settlement plane**: store contract, pending-settlement reconciliation,
//! and the engine that ties the pipeline together.
//!
//! ## Architecture
//!
//! Every recomputation runs as one transaction against the ledger store:
//! 1. Read a full ledger snapshot (participants, eligible expenses, PAID settlements)
//! 2. Compute net balances and check the zero-sum invariant
//! 3. Match debtors to creditors
//! 4. Diff the suggestions against the PENDING rows: overwrite, create, cancel
//! 5. Commit, or roll back everything on the first failure
//!
//! PENDING rows are a materialised view owned by the [`Reconciler`]; running
//! the pipeline again on an unchanged ledger converges to the same rows.

pub mod engine;
pub mod memory;
pub mod reconciler;
pub mod store;
pub mod zero_sum;

pub use engine::{RecomputeTrigger, SettlementCalculation, SettlementEngine, SettlementSummary};
pub use memory::InMemoryLedger;
pub use reconciler::{PendingUpdate, ReconcilePlan, ReconcileReport, Reconciler};
pub use store::{LedgerReader, LedgerSnapshot, LedgerStore, SettlementWriter};
pub use zero_sum::ZeroSumCheck;
