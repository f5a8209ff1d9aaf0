//! Access/funds checks run before any state is touched.

use crate::error::{LotteryError, Result};
use crate::types::Identity;
use bitcoin::Amount;

pub fn require_owner(owner: &Identity, caller: &Identity) -> Result<()> {
    if caller != owner {
        return Err(LotteryError::Unauthorized { caller: *caller });
    }
    Ok(())
}

/// Both under- and over-payment are rejected; there is no change logic
pub fn require_exact_fee(entry_fee: Amount, value: Amount) -> Result<()> {
    if value != entry_fee {
        return Err(LotteryError::InvalidPayment {
            expected: entry_fee,
            got: value,
        });
    }
    Ok(())
}

pub fn require_capacity(count: usize, max_participants: usize) -> Result<()> {
    if count >= max_participants {
        return Err(LotteryError::RoundFull {
            max: max_participants,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_owner() {
        let owner = Identity::random();
        assert!(require_owner(&owner, &owner).is_ok());

        let other = Identity::random();
        match require_owner(&owner, &other) {
            Err(LotteryError::Unauthorized { caller }) => assert_eq!(caller, other),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_require_exact_fee() {
        let fee = Amount::from_sat(2_000_000);
        assert!(require_exact_fee(fee, fee).is_ok());
        assert!(matches!(
            require_exact_fee(fee, Amount::from_sat(1_999_999)),
            Err(LotteryError::InvalidPayment { .. })
        ));
        assert!(matches!(
            require_exact_fee(fee, Amount::from_sat(2_000_001)),
            Err(LotteryError::InvalidPayment { .. })
        ));
    }

    #[test]
    fn test_require_capacity() {
        assert!(require_capacity(9, 10).is_ok());
        assert!(matches!(
            require_capacity(10, 10),
            Err(LotteryError::RoundFull { max: 10 })
        ));
        assert!(require_capacity(3, 2).is_err());
    }
}
