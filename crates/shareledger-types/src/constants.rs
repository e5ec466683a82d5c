//! System-wide constants for the ShareLedger settlement engine.

/// Fractional digits kept for per-person shares and balances.
pub const SHARE_SCALE: u32 = 2;

/// Days between creating a pending settlement and its due date.
pub const DEFAULT_DUE_OFFSET_DAYS: i64 = 30;

/// Upper bound accepted for a configured due offset (ten years).
pub const MAX_DUE_OFFSET_DAYS: i64 = 3650;

/// Upper bound accepted for a configured share scale.
pub const MAX_SHARE_SCALE: u32 = 8;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "ShareLedger";
