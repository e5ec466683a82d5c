//! # shareledger-balance
//!
//! **Pure deterministic settlement computation for ShareLedger.**
//!
//! This crate is the compute plane. It takes an immutable ledger snapshot
//! (participants, shared expenses, paid settlements) and produces net
//! balances and the transfers that clear them. It has:
//!
//! - **Zero side effects**: no store access, no persisted state
//! - **Deterministic output**: the same snapshot always yields the same
//!   suggestions, in the same order
//! - **Exact decimal arithmetic**: half-up rounding per share, no floats

pub mod calculator;
pub mod digest;
pub mod matcher;

pub use calculator::compute_balances;
pub use digest::{plan_digest, verify_plan_digest};
pub use matcher::match_balances;
