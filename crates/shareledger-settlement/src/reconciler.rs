//! Pending-settlement reconciler.
//!
//! Keeps the PENDING rows equal to the latest matcher output:
//! 1. Key every PENDING row and every suggestion by (debtor, creditor)
//! 2. Suggestion with a matching row → overwrite the row's amount
//! 3. Suggestion without a row → insert a new PENDING row due in
//!    `due_offset_days`
//! 4. Row that no suggestion matched → CANCELLED
//!
//! The diff is computed as a pure [`ReconcilePlan`] first and written
//! afterwards. [`Reconciler::reconcile`] wraps both steps in one
//! transaction, so a failed write leaves the previous rows untouched.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shareledger_balance::plan_digest;
use shareledger_types::{
    EngineConfig, LedgerError, PairKey, ParticipantId, Result, SettlementId, SettlementPayment,
    SettlementState, SettlementSuggestion,
};

use crate::store::{LedgerReader, LedgerStore, SettlementWriter};

/// Overwrite of an existing PENDING row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    /// The row with its new amount.
    pub record: SettlementPayment,
    pub previous_amount: Decimal,
}

impl PendingUpdate {
    /// Whether the overwrite leaves the amount as it was.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.record.amount == self.previous_amount
    }
}

/// Writes needed to bring the PENDING rows in line with a set of suggestions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub updates: Vec<PendingUpdate>,
    pub creates: Vec<SettlementPayment>,
    pub cancellations: Vec<SettlementPayment>,
    /// Fingerprint of the suggestions this plan was built from.
    pub digest: [u8; 32],
}

impl ReconcilePlan {
    /// Total rows this plan writes.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.updates.len() + self.creates.len() + self.cancellations.len()
    }
}

/// What a reconciliation actually wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: Vec<SettlementId>,
    /// Rows overwritten with a different amount.
    pub updated: Vec<SettlementId>,
    /// Rows overwritten with the amount they already had.
    pub unchanged: Vec<SettlementId>,
    pub cancelled: Vec<SettlementId>,
    pub digest: [u8; 32],
}

impl ReconcileReport {
    /// Whether the persisted obligations are the same as before the run.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.created.is_empty() && self.updated.is_empty() && self.cancelled.is_empty()
    }

    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }
}

/// Diffs suggestions against PENDING rows and applies the result.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    config: EngineConfig,
}

impl Reconciler {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the plan that turns `pending` into the rows `suggestions` call for.
    ///
    /// Rows passed in `pending` that are not actually PENDING are ignored. If
    /// several PENDING rows share a key, the one with the lowest id is kept as
    /// the match target and the rest are cancelled. Suggestions repeating a
    /// key are merged into one amount.
    pub fn plan(
        &self,
        suggestions: &[SettlementSuggestion],
        pending: Vec<SettlementPayment>,
        now: DateTime<Utc>,
    ) -> Result<ReconcilePlan> {
        let mut plan = ReconcilePlan {
            digest: plan_digest(suggestions),
            ..ReconcilePlan::default()
        };

        let mut rows: Vec<SettlementPayment> = pending
            .into_iter()
            .filter(|row| row.state == SettlementState::Pending)
            .collect();
        rows.sort_by_key(|row| row.id);

        let mut existing: BTreeMap<PairKey, SettlementPayment> = BTreeMap::new();
        for mut row in rows {
            if existing.contains_key(&row.key()) {
                tracing::warn!(
                    settlement = ?row.id,
                    from = %row.from,
                    to = %row.to,
                    "Duplicate pending settlement for pair, cancelling"
                );
                row.mark_cancelled()?;
                plan.cancellations.push(row);
            } else {
                existing.insert(row.key(), row);
            }
        }

        for (key, amount) in merge_by_key(suggestions) {
            if let Some(mut row) = existing.remove(&key) {
                let previous_amount = row.amount;
                row.amount = amount;
                plan.updates.push(PendingUpdate {
                    record: row,
                    previous_amount,
                });
            } else {
                plan.creates.push(SettlementPayment::pending(
                    key.0,
                    key.1,
                    amount,
                    self.config.due_offset_days,
                    now,
                ));
            }
        }

        for (_, mut row) in existing {
            row.mark_cancelled()?;
            plan.cancellations.push(row);
        }

        Ok(plan)
    }

    /// Write `plan` through `writer`. Not transactional on its own.
    pub fn apply<W: SettlementWriter + ?Sized>(
        &self,
        writer: &mut W,
        plan: ReconcilePlan,
    ) -> Result<ReconcileReport> {
        let mut report = ReconcileReport {
            digest: plan.digest,
            ..ReconcileReport::default()
        };

        for update in plan.updates {
            let unchanged = update.is_unchanged();
            let saved = writer.upsert_settlement_payment(update.record)?;
            let id = stored_id(&saved)?;
            tracing::debug!(settlement = %id, amount = %saved.amount, unchanged, "Pending settlement overwritten");
            if unchanged {
                report.unchanged.push(id);
            } else {
                report.updated.push(id);
            }
        }

        for row in plan.creates {
            let saved = writer.upsert_settlement_payment(row)?;
            let id = stored_id(&saved)?;
            tracing::debug!(
                settlement = %id,
                from = %saved.from,
                to = %saved.to,
                amount = %saved.amount,
                due = %saved.due_date,
                "Pending settlement created"
            );
            report.created.push(id);
        }

        for row in plan.cancellations {
            let saved = writer.upsert_settlement_payment(row)?;
            let id = stored_id(&saved)?;
            tracing::debug!(settlement = %id, "Pending settlement cancelled");
            report.cancelled.push(id);
        }

        Ok(report)
    }

    /// Reconcile inside a transaction the caller already holds.
    ///
    /// # Errors
    /// - [`LedgerError::InvalidReference`] if a suggestion names an unknown
    ///   participant (checked before any write)
    /// - [`LedgerError::DataAccess`] from the store
    pub fn reconcile_within<S: LedgerReader + SettlementWriter + ?Sized>(
        &self,
        store: &mut S,
        suggestions: &[SettlementSuggestion],
        now: DateTime<Utc>,
    ) -> Result<ReconcileReport> {
        let known: BTreeSet<ParticipantId> =
            store.list_participants()?.into_iter().map(|p| p.id).collect();
        for suggestion in suggestions {
            for participant in [suggestion.from, suggestion.to] {
                if !known.contains(&participant) {
                    return Err(LedgerError::InvalidReference {
                        participant,
                        context: format!("suggestion {} -> {}", suggestion.from, suggestion.to),
                    });
                }
            }
        }

        let pending = store.list_settlement_payments(SettlementState::Pending)?;
        let plan = self.plan(suggestions, pending, now)?;
        self.apply(store, plan)
    }

    /// Reconcile as one atomic unit: all writes commit or none do.
    pub fn reconcile<S: LedgerStore>(
        &self,
        store: &mut S,
        suggestions: &[SettlementSuggestion],
        now: DateTime<Utc>,
    ) -> Result<ReconcileReport> {
        store.atomically(|tx| self.reconcile_within(tx, suggestions, now))
    }
}

/// Sum suggestions per key, keeping first-seen order.
fn merge_by_key(suggestions: &[SettlementSuggestion]) -> Vec<(PairKey, Decimal)> {
    let mut merged: Vec<(PairKey, Decimal)> = Vec::with_capacity(suggestions.len());
    let mut index: HashMap<PairKey, usize> = HashMap::with_capacity(suggestions.len());
    for suggestion in suggestions {
        match index.get(&suggestion.key()) {
            Some(&i) => merged[i].1 += suggestion.amount,
            None => {
                index.insert(suggestion.key(), merged.len());
                merged.push((suggestion.key(), suggestion.amount));
            }
        }
    }
    merged
}

pub(crate) fn stored_id(saved: &SettlementPayment) -> Result<SettlementId> {
    saved
        .id
        .ok_or_else(|| LedgerError::data_access("store returned a row without an id"))
}
