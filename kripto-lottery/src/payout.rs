use crate::types::Identity;
use bitcoin::Amount;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Value transfer out of the lottery's escrow.
///
/// Implementations must either move the full amount or return an error and
/// move nothing.
pub trait PayoutHandler {
    fn pay(&mut self, to: &Identity, amount: Amount) -> Result<(), String>;
}

/// Balance book for hosts without a real value-transfer layer: tracks what
/// each identity holds and what sits in the lottery escrow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ledger {
    balances: HashMap<Identity, Amount>,
    escrow: Amount,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            balances: HashMap::new(),
            escrow: Amount::ZERO,
        }
    }
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self, identity: &Identity) -> Amount {
        self.balances.get(identity).copied().unwrap_or(Amount::ZERO)
    }

    pub fn escrow(&self) -> Amount {
        self.escrow
    }

    pub fn credit(&mut self, identity: &Identity, amount: Amount) -> Result<(), String> {
        let balance = self.balance(identity);
        let updated = balance
            .checked_add(amount)
            .ok_or_else(|| format!("balance overflow for {}", identity))?;
        self.balances.insert(*identity, updated);
        Ok(())
    }

    /// Moves `amount` from `from` into escrow, as a join payment does
    pub fn deposit(&mut self, from: &Identity, amount: Amount) -> Result<(), String> {
        let balance = self.balance(from);
        let remaining = balance.checked_sub(amount).ok_or_else(|| {
            format!(
                "insufficient balance: need {} sats, have {} sats",
                amount.to_sat(),
                balance.to_sat()
            )
        })?;
        let escrow = self
            .escrow
            .checked_add(amount)
            .ok_or_else(|| "escrow overflow".to_string())?;
        self.balances.insert(*from, remaining);
        self.escrow = escrow;
        Ok(())
    }
}

impl PayoutHandler for Ledger {
    fn pay(&mut self, to: &Identity, amount: Amount) -> Result<(), String> {
        let escrow = self.escrow.checked_sub(amount).ok_or_else(|| {
            format!(
                "escrow holds {} sats, cannot pay {} sats",
                self.escrow.to_sat(),
                amount.to_sat()
            )
        })?;
        let updated = self
            .balance(to)
            .checked_add(amount)
            .ok_or_else(|| format!("balance overflow for {}", to))?;
        self.escrow = escrow;
        self.balances.insert(*to, updated);
        Ok(())
    }
}
