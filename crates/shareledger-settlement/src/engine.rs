//! Settlement engine: the entry point the surrounding application calls.
//!
//! ```text
//! ledger snapshot → compute_balances → ZeroSumCheck → match_balances → Reconciler
//! ```
//!
//! [`SettlementEngine::recompute`] runs after every ledger mutation (a
//! shared expense created or updated, a settlement paid) and on demand. The
//! whole read → compute → write cycle is one store transaction; on any error
//! nothing is written and the caller may simply call it again.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use shareledger_balance::{compute_balances, match_balances, plan_digest};
use shareledger_types::constants::{ENGINE_NAME, VERSION};
use shareledger_types::{
    BalanceSheet, EngineConfig, ExpenseId, LedgerError, ParticipantId, Result, SettlementId,
    SettlementPayment, SettlementState, SettlementSuggestion,
};

use crate::reconciler::{ReconcileReport, Reconciler, stored_id};
use crate::store::{LedgerReader, LedgerSnapshot, LedgerStore, SettlementWriter};
use crate::zero_sum::ZeroSumCheck;

/// Why a recomputation was started. Logged with every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecomputeTrigger {
    ExpenseCreated(ExpenseId),
    ExpenseUpdated(ExpenseId),
    SettlementPaid(SettlementId),
    OnDemand,
}

impl fmt::Display for RecomputeTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpenseCreated(id) => write!(f, "expense_created({id})"),
            Self::ExpenseUpdated(id) => write!(f, "expense_updated({id})"),
            Self::SettlementPaid(id) => write!(f, "settlement_paid({id})"),
            Self::OnDemand => write!(f, "on_demand"),
        }
    }
}

/// Current balances and the transfers that would clear them.
#[derive(Debug, Clone, Serialize)]
pub struct SettlementCalculation {
    pub balances: BalanceSheet,
    pub suggestions: Vec<SettlementSuggestion>,
}

/// Counts and totals over the settlement table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettlementSummary {
    pub total: usize,
    pub pending: usize,
    pub paid: usize,
    pub cancelled: usize,
    /// PENDING rows past their due date.
    pub overdue: usize,
    pub total_amount: Decimal,
    pub pending_amount: Decimal,
}

/// Owns a ledger store and runs the settlement pipeline against it.
pub struct SettlementEngine<S: LedgerStore> {
    store: S,
    reconciler: Reconciler,
    zero_sum: ZeroSumCheck,
}

impl<S: LedgerStore> SettlementEngine<S> {
    /// # Errors
    /// Returns [`LedgerError::Configuration`] if `config` is out of range.
    pub fn new(store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            engine = ENGINE_NAME,
            version = VERSION,
            due_offset_days = config.due_offset_days,
            share_scale = config.share_scale,
            "Settlement engine ready"
        );
        Ok(Self {
            store,
            zero_sum: ZeroSumCheck::new(config.share_scale),
            reconciler: Reconciler::new(config),
        })
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access for the collaborator side (expense management,
    /// user directory). PENDING rows must only be written by the engine.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        self.reconciler.config()
    }

    /// Compute balances and suggestions without writing anything.
    pub fn calculate(&self) -> Result<SettlementCalculation> {
        calculate_from(&self.store, &self.zero_sum, self.config().share_scale)
    }

    /// Recompute and reconcile PENDING settlements as one transaction.
    pub fn recompute(&mut self, trigger: RecomputeTrigger) -> Result<ReconcileReport> {
        self.recompute_at(trigger, Utc::now())
    }

    /// [`Self::recompute`] with an explicit clock.
    pub fn recompute_at(
        &mut self,
        trigger: RecomputeTrigger,
        now: DateTime<Utc>,
    ) -> Result<ReconcileReport> {
        let (reconciler, zero_sum) = (&self.reconciler, &self.zero_sum);
        self.store
            .atomically(|tx| recompute_within(tx, reconciler, zero_sum, trigger, now))
    }

    /// Record that a PENDING settlement was paid, then recompute.
    ///
    /// The status change and the recomputation commit together.
    ///
    /// # Errors
    /// - [`LedgerError::SettlementNotFound`] if `id` does not exist
    /// - [`LedgerError::InvalidTransition`] if the row is not PENDING
    pub fn mark_paid(
        &mut self,
        id: SettlementId,
        payment_method: Option<String>,
        notes: Option<String>,
    ) -> Result<SettlementPayment> {
        self.mark_paid_at(id, payment_method, notes, Utc::now())
    }

    /// [`Self::mark_paid`] with an explicit clock.
    pub fn mark_paid_at(
        &mut self,
        id: SettlementId,
        payment_method: Option<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SettlementPayment> {
        let (reconciler, zero_sum) = (&self.reconciler, &self.zero_sum);
        self.store.atomically(|tx| {
            let mut row = tx
                .get_settlement_payment(id)?
                .ok_or(LedgerError::SettlementNotFound(id))?;
            row.mark_paid(payment_method, notes, now)?;
            let saved = tx.upsert_settlement_payment(row)?;

            tracing::info!(settlement = %id, amount = %saved.amount, "Settlement marked paid");
            recompute_within(tx, reconciler, zero_sum, RecomputeTrigger::SettlementPaid(id), now)?;
            Ok(saved)
        })
    }

    /// Record a partial payment against a PENDING settlement, then recompute.
    ///
    /// A new PAID row for `amount` is added between the same two parties;
    /// the recomputation then shrinks (or cancels) the original PENDING row.
    ///
    /// # Errors
    /// - [`LedgerError::NonPositiveAmount`] if `amount <= 0`
    /// - [`LedgerError::SettlementNotFound`] if `original` does not exist
    /// - [`LedgerError::Validation`] if `original` is not PENDING
    pub fn record_partial_payment(
        &mut self,
        original: SettlementId,
        amount: Decimal,
        payment_method: Option<String>,
        notes: Option<String>,
    ) -> Result<SettlementPayment> {
        self.record_partial_payment_at(original, amount, payment_method, notes, Utc::now())
    }

    /// [`Self::record_partial_payment`] with an explicit clock.
    pub fn record_partial_payment_at(
        &mut self,
        original: SettlementId,
        amount: Decimal,
        payment_method: Option<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<SettlementPayment> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }

        let (reconciler, zero_sum) = (&self.reconciler, &self.zero_sum);
        self.store.atomically(|tx| {
            let source = tx
                .get_settlement_payment(original)?
                .ok_or(LedgerError::SettlementNotFound(original))?;
            if source.state != SettlementState::Pending {
                return Err(LedgerError::Validation {
                    reason: format!(
                        "partial payment needs a PENDING settlement, {original} is {}",
                        source.state
                    ),
                });
            }

            let record = SettlementPayment {
                id: None,
                from: source.from,
                to: source.to,
                amount,
                state: SettlementState::Paid,
                due_date: source.due_date,
                created_at: now,
                paid_at: Some(now),
                payment_method,
                notes,
            };
            let saved = tx.upsert_settlement_payment(record)?;
            let paid_id = stored_id(&saved)?;

            tracing::info!(
                settlement = %paid_id,
                original = %original,
                amount = %amount,
                "Partial payment recorded"
            );
            recompute_within(tx, reconciler, zero_sum, RecomputeTrigger::SettlementPaid(paid_id), now)?;
            Ok(saved)
        })
    }

    /// Counts and totals over every settlement row.
    pub fn summary(&self, now: DateTime<Utc>) -> Result<SettlementSummary> {
        let mut summary = SettlementSummary::default();
        for row in self.store.list_all_settlement_payments()? {
            summary.total += 1;
            summary.total_amount += row.amount;
            match row.state {
                SettlementState::Pending => {
                    summary.pending += 1;
                    summary.pending_amount += row.amount;
                    if row.is_overdue(now) {
                        summary.overdue += 1;
                    }
                }
                SettlementState::Paid => summary.paid += 1,
                SettlementState::Cancelled => summary.cancelled += 1,
            }
        }
        Ok(summary)
    }

    /// PENDING rows past their due date at `now`.
    pub fn overdue(&self, now: DateTime<Utc>) -> Result<Vec<SettlementPayment>> {
        Ok(self
            .store
            .list_settlement_payments(SettlementState::Pending)?
            .into_iter()
            .filter(|row| row.is_overdue(now))
            .collect())
    }

    /// Every row where `participant` pays or receives.
    pub fn settlements_for(&self, participant: ParticipantId) -> Result<Vec<SettlementPayment>> {
        Ok(self
            .store
            .list_all_settlement_payments()?
            .into_iter()
            .filter(|row| row.from == participant || row.to == participant)
            .collect())
    }
}

fn calculate_from<R: LedgerReader + ?Sized>(
    reader: &R,
    zero_sum: &ZeroSumCheck,
    scale: u32,
) -> Result<SettlementCalculation> {
    let snapshot = LedgerSnapshot::read(reader)?;
    let balances = compute_balances(
        &snapshot.participants,
        &snapshot.expenses,
        &snapshot.paid,
        scale,
    )?;
    zero_sum.verify(&balances, &snapshot.expenses)?;
    let suggestions = match_balances(&balances);
    Ok(SettlementCalculation {
        balances,
        suggestions,
    })
}

fn recompute_within<S: LedgerReader + SettlementWriter + ?Sized>(
    tx: &mut S,
    reconciler: &Reconciler,
    zero_sum: &ZeroSumCheck,
    trigger: RecomputeTrigger,
    now: DateTime<Utc>,
) -> Result<ReconcileReport> {
    let calculation = calculate_from(&*tx, zero_sum, reconciler.config().share_scale)?;
    let report = reconciler.reconcile_within(tx, &calculation.suggestions, now)?;

    debug_assert_eq!(report.digest, plan_digest(&calculation.suggestions));
    tracing::info!(
        trigger = %trigger,
        suggestions = calculation.suggestions.len(),
        created = report.created.len(),
        updated = report.updated.len(),
        unchanged = report.unchanged.len(),
        cancelled = report.cancelled.len(),
        digest = %report.digest_hex(),
        "Settlements reconciled"
    );
    Ok(report)
}
