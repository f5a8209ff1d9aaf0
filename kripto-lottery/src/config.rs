use crate::commitment::CommitmentScheme;
use crate::error::{LotteryError, Result};
use bitcoin::Amount;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_PARTICIPANTS: usize = 10;
pub const DEFAULT_ENTRY_FEE_SATS: u64 = 2_000_000;
/// 0.02 BTC
pub const DEFAULT_ENTRY_FEE: Amount = Amount::from_sat(DEFAULT_ENTRY_FEE_SATS);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryConfig {
    pub max_participants: usize,
    pub entry_fee: Amount,
    /// Fixed for the lifetime of the engine
    pub commitment_scheme: CommitmentScheme,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            max_participants: DEFAULT_MAX_PARTICIPANTS,
            entry_fee: DEFAULT_ENTRY_FEE,
            commitment_scheme: CommitmentScheme::IdentityBound,
        }
    }
}

impl LotteryConfig {
    pub fn new(max_participants: usize, entry_fee: Amount) -> Self {
        Self {
            max_participants,
            entry_fee,
            ..Self::default()
        }
    }

    pub fn with_scheme(mut self, scheme: CommitmentScheme) -> Self {
        self.commitment_scheme = scheme;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_max_participants(self.max_participants)?;

        if self.entry_fee == Amount::ZERO {
            return Err(LotteryError::config("Entry fee must be greater than 0"));
        }

        Ok(())
    }
}

pub(crate) fn validate_max_participants(max: usize) -> Result<()> {
    if max == 0 {
        return Err(LotteryError::config(
            "Max participants must be greater than 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LotteryConfig::default();
        assert_eq!(config.max_participants, 10);
        assert_eq!(config.entry_fee, Amount::from_btc(0.02).unwrap());
        assert_eq!(config.commitment_scheme, CommitmentScheme::IdentityBound);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = LotteryConfig::new(0, DEFAULT_ENTRY_FEE);
        assert!(matches!(config.validate(), Err(LotteryError::Config(_))));

        let config = LotteryConfig::new(5, Amount::ZERO);
        assert!(matches!(config.validate(), Err(LotteryError::Config(_))));
    }
}
