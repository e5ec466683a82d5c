//! Engine configuration.
//!
//! Hosts usually embed this in their own settings file; it deserializes from
//! JSON with every field optional.

use serde::{Deserialize, Serialize};

use crate::{LedgerError, Result, constants};

/// Tunables for the settlement engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Days until a newly created PENDING settlement falls due.
    pub due_offset_days: i64,
    /// Fractional digits for per-person shares (half-up rounding).
    pub share_scale: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            due_offset_days: constants::DEFAULT_DUE_OFFSET_DAYS,
            share_scale: constants::SHARE_SCALE,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON document.
    ///
    /// # Errors
    /// Returns [`LedgerError::Configuration`] on malformed JSON or
    /// out-of-range values.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    /// Returns [`LedgerError::Configuration`] if a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if !(0..=constants::MAX_DUE_OFFSET_DAYS).contains(&self.due_offset_days) {
            return Err(LedgerError::Configuration(format!(
                "due_offset_days must be within 0..={}, got {}",
                constants::MAX_DUE_OFFSET_DAYS,
                self.due_offset_days
            )));
        }
        if self.share_scale > constants::MAX_SHARE_SCALE {
            return Err(LedgerError::Configuration(format!(
                "share_scale must be at most {}, got {}",
                constants::MAX_SHARE_SCALE,
                self.share_scale
            )));
        }
        Ok(())
    }
}
