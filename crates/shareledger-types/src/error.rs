//! Error types for the ShareLedger settlement engine.
//!
//! All errors use the `SL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Data access errors (ledger reader / settlement store)
//! - 2xx: Reference errors (unknown participants)
//! - 3xx: Validation errors (rejected upstream input)
//! - 4xx: Settlement lifecycle errors
//! - 5xx: Invariant errors
//! - 9xx: General / configuration errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{ParticipantId, SettlementId, SettlementState};

/// Central error enum for all ShareLedger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // =================================================================
    // Data Access Errors (1xx)
    // =================================================================
    /// Reading or writing the ledger store failed. The in-flight
    /// recomputation is aborted and rolled back.
    #[error("SL_ERR_100: Data access failed: {reason}")]
    DataAccess { reason: String },

    // =================================================================
    // Reference Errors (2xx)
    // =================================================================
    /// An expense, payment, or suggestion names a participant that is not in
    /// the participant set.
    #[error("SL_ERR_200: Unknown participant {participant} referenced by {context}")]
    InvalidReference {
        participant: ParticipantId,
        context: String,
    },

    // =================================================================
    // Validation Errors (3xx)
    // =================================================================
    /// Input rejected before it reaches the balance calculator.
    #[error("SL_ERR_300: Validation failed: {reason}")]
    Validation { reason: String },

    /// A monetary amount that must be strictly positive was not.
    #[error("SL_ERR_301: Amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    // =================================================================
    // Settlement Lifecycle Errors (4xx)
    // =================================================================
    /// The requested settlement payment does not exist.
    #[error("SL_ERR_400: Settlement not found: {0}")]
    SettlementNotFound(SettlementId),

    /// The settlement cannot move to the requested state.
    #[error("SL_ERR_401: Cannot transition {id} from {from} to {to}")]
    InvalidTransition {
        id: SettlementId,
        from: SettlementState,
        to: SettlementState,
    },

    // =================================================================
    // Invariant Errors (5xx)
    // =================================================================
    /// Balances no longer sum to the accumulated rounding residue.
    #[error("SL_ERR_500: Zero-sum invariant violation: {reason}")]
    ZeroSumViolation { reason: String },

    // =================================================================
    // General (9xx)
    // =================================================================
    /// Configuration error (invalid values, unparsable document).
    #[error("SL_ERR_900: Configuration error: {0}")]
    Configuration(String),
}

impl LedgerError {
    /// Shorthand for a [`LedgerError::DataAccess`] with the given reason.
    pub fn data_access(reason: impl Into<String>) -> Self {
        Self::DataAccess {
            reason: reason.into(),
        }
    }

    /// Whether a caller may retry the whole recomputation from scratch.
    ///
    /// Only store failures are transient; everything else will fail the
    /// same way on an unchanged ledger.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::DataAccess { .. })
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerError>;

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Configuration(err.to_string())
    }
}
