//! # shareledger-types
//!
//! Shared types, errors, and configuration for the **ShareLedger** settlement
//! engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`ParticipantId`], [`ExpenseId`], [`SettlementId`]
//! - **Expense model**: [`Participant`], [`SharedExpense`], [`ExpenseStatus`]
//! - **Settlement model**: [`SettlementPayment`], [`SettlementState`], [`SettlementSuggestion`]
//! - **Balance model**: [`BalanceSheet`]
//! - **Configuration**: [`EngineConfig`]
//! - **Errors**: [`LedgerError`] with `SL_ERR_` prefix codes
//! - **Constants**: defaults shared by the compute and settlement crates

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod expense;
pub mod ids;
pub mod settlement;

// Re-export all primary types at crate root for ergonomic imports:
//   use shareledger_types::{SharedExpense, SettlementPayment, BalanceSheet, ...};

pub use balance::*;
pub use config::*;
pub use error::*;
pub use expense::*;
pub use ids::*;
pub use settlement::*;

// Constants are accessed via `shareledger_types::constants::FOO`
// (not re-exported to avoid name collisions).
