//! Ledger configuration.

use crate::constants::{DEFAULT_DIFFICULTY, DEFAULT_MINING_REWARD, HASH_HEX_SIZE};
use crate::error::ConfigError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which built-in admission policy a ledger starts with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdmissionMode {
    /// Accept every transaction.
    #[default]
    Permissive,
    /// Reject empty parties and non-positive amounts.
    WellFormed,
    /// Well-formed and carrying a hex signature. No identities are registered,
    /// so signatures are not verified; inject a [`Signed`](crate::policy::Signed)
    /// policy with registered senders for that.
    Signed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Leading `'0'` hex characters a mined block hash must have.
    pub difficulty: u32,
    /// Amount credited to the miner for every block.
    pub mining_reward: Decimal,
    pub admission: AdmissionMode,
    /// Search nonces on the rayon pool instead of the calling thread.
    pub parallel_mining: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining_reward: Decimal::from(DEFAULT_MINING_REWARD),
            admission: AdmissionMode::Permissive,
            parallel_mining: false,
        }
    }
}

impl LedgerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.difficulty as usize > HASH_HEX_SIZE {
            return Err(ConfigError::DifficultyTooHigh {
                difficulty: self.difficulty,
                max: HASH_HEX_SIZE,
            });
        }
        if self.mining_reward <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveReward);
        }
        Ok(())
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let c = LedgerConfig::default();
        assert_eq!(c.difficulty, 2);
        assert_eq!(c.mining_reward, Decimal::from(100));
        assert_eq!(c.admission, AdmissionMode::Permissive);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn zero_difficulty_is_allowed() {
        let c = LedgerConfig {
            difficulty: 0,
            ..Default::default()
        };
        assert!(c.validate().is_ok());
    }

    #[test]
    fn rejects_unreachable_difficulty() {
        let c = LedgerConfig {
            difficulty: 65,
            ..Default::default()
        };
        assert!(matches!(
            c.validate(),
            Err(ConfigError::DifficultyTooHigh { difficulty: 65, max: 64 })
        ));
    }

    #[test]
    fn rejects_non_positive_reward() {
        let c = LedgerConfig {
            mining_reward: Decimal::ZERO,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::NonPositiveReward)));
    }

    #[test]
    fn parses_partial_json() {
        let c = LedgerConfig::from_json(r#"{"difficulty":3,"admission":"well_formed"}"#).unwrap();
        assert_eq!(c.difficulty, 3);
        assert_eq!(c.admission, AdmissionMode::WellFormed);
        assert_eq!(c.mining_reward, Decimal::from(100));
    }

    #[test]
    fn parses_string_reward() {
        let c = LedgerConfig::from_json(r#"{"mining_reward":"12.5"}"#).unwrap();
        assert_eq!(c.mining_reward, Decimal::new(125, 1));
    }

    #[test]
    fn bad_json_is_parse_error() {
        assert!(matches!(
            LedgerConfig::from_json("{difficulty"),
            Err(ConfigError::Parse(_))
        ));
    }
}
