//! # Settlement payments: recorded and suggested debtor → creditor transfers
//!
//! ## State Machine
//!
//! ```text
//!   ┌─────────┐  payment recorded  ┌──────┐
//!   │ PENDING ├───────────────────▶│ PAID │
//!   └────┬────┘                    └──────┘
//!        │ obligation disappeared
//!        ▼
//!   ┌───────────┐
//!   │ CANCELLED │
//!   └───────────┘
//! ```
//!
//! PENDING rows are derived state owned by the reconciler: they are
//! rewritten or cancelled on every recomputation. PAID rows are historical
//! fact and offset future balance computations. Overdue is not a state; a
//! PENDING row is overdue once its due date has passed.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{LedgerError, PairKey, ParticipantId, Result, SettlementId};

/// The lifecycle state of a settlement payment.
///
/// Transitions are **monotonic** (never go backwards):
/// - `Pending → Paid` (money actually changed hands)
/// - `Pending → Cancelled` (a recomputation no longer needs this transfer)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementState {
    Pending,
    Paid,
    Cancelled,
}

impl SettlementState {
    /// Can a payment in this state transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!((self, target), (Self::Pending, Self::Paid | Self::Cancelled))
    }
}

impl std::fmt::Display for SettlementState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Paid => write!(f, "PAID"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// A persisted settlement: `from` owes (or paid) `amount` to `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementPayment {
    /// Store-assigned id. `None` until the record is first persisted.
    pub id: Option<SettlementId>,
    /// Debtor.
    pub from: ParticipantId,
    /// Creditor.
    pub to: ParticipantId,
    pub amount: Decimal,
    pub state: SettlementState,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

impl SettlementPayment {
    /// A new, not yet persisted PENDING record due `due_offset_days` after `now`.
    #[must_use]
    pub fn pending(
        from: ParticipantId,
        to: ParticipantId,
        amount: Decimal,
        due_offset_days: i64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            from,
            to,
            amount,
            state: SettlementState::Pending,
            due_date: now + Duration::days(due_offset_days),
            created_at: now,
            paid_at: None,
            payment_method: None,
            notes: None,
        }
    }

    /// Ordered (debtor, creditor) key used by the reconciler.
    #[must_use]
    pub fn key(&self) -> PairKey {
        (self.from, self.to)
    }

    /// Whether this PENDING record is past its due date at `now`.
    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.state == SettlementState::Pending && now > self.due_date
    }

    /// Record that the money was paid.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidTransition`] if the record is not PENDING.
    pub fn mark_paid(
        &mut self,
        payment_method: Option<String>,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        self.transition(SettlementState::Paid)?;
        self.paid_at.get_or_insert(now);
        self.payment_method = payment_method;
        self.notes = notes;
        Ok(())
    }

    /// Retire a PENDING record whose obligation no longer exists.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidTransition`] if the record is not PENDING.
    pub fn mark_cancelled(&mut self) -> Result<()> {
        self.transition(SettlementState::Cancelled)
    }

    fn transition(&mut self, target: SettlementState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(LedgerError::InvalidTransition {
                id: self.id.unwrap_or(SettlementId(0)),
                from: self.state,
                to: target,
            });
        }
        self.state = target;
        Ok(())
    }
}

/// A transfer computed by the matcher: `from` should pay `amount` to `to`.
///
/// Ephemeral; the reconciler persists it as a PENDING [`SettlementPayment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSuggestion {
    pub from: ParticipantId,
    pub to: ParticipantId,
    /// Strictly positive.
    pub amount: Decimal,
}

impl SettlementSuggestion {
    #[must_use]
    pub fn new(from: ParticipantId, to: ParticipantId, amount: Decimal) -> Self {
        Self { from, to, amount }
    }

    #[must_use]
    pub fn key(&self) -> PairKey {
        (self.from, self.to)
    }
}

/// Dummy settlement for testing. **Never use in production.**
#[cfg(any(test, feature = "test-helpers"))]
impl SettlementPayment {
    /// A persisted record with the given id and state, due thirty days out.
    pub fn dummy(id: u64, from: u64, to: u64, amount_cents: i64, state: SettlementState) -> Self {
        let mut payment = Self::pending(
            ParticipantId(from),
            ParticipantId(to),
            Decimal::new(amount_cents, 2),
            crate::constants::DEFAULT_DUE_OFFSET_DAYS,
            Utc::now(),
        );
        payment.id = Some(SettlementId(id));
        payment.state = state;
        if state == SettlementState::Paid {
            payment.paid_at = Some(payment.created_at);
        }
        payment
    }
}
