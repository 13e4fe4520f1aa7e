//! Configuration types for an EscrowSwap engine.

use serde::{Deserialize, Serialize};

use crate::{constants, EscrowswapError, Result};

/// Whether a seller may fulfill their own order.
///
/// Under `Allow` a self-fulfilment returns the escrow to the seller and
/// pays the seller from their own balance. `Reject` fails the call with
/// `SelfTradeBlocked` instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfTradePolicy {
    #[default]
    Allow,
    Reject,
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Self-trade handling on `fulfill_order`.
    pub self_trade: SelfTradePolicy,
    /// Maximum number of journal entries kept in memory.
    pub journal_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            self_trade: SelfTradePolicy::default(),
            journal_capacity: constants::DEFAULT_JOURNAL_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document. Missing fields take defaults.
    ///
    /// # Errors
    /// Returns `Serialization` for malformed JSON and `Configuration` for
    /// out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// # Errors
    /// Returns `Configuration` if `journal_capacity` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.journal_capacity == 0 {
            return Err(EscrowswapError::Configuration(
                "journal_capacity must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
