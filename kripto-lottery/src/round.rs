use crate::error::{LotteryError, Result};
use crate::participant::Participant;
use crate::types::{Identity, Secret};
use bitcoin::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// State of the single active round.
///
/// Each join takes one seat; a wallet may hold several. `reveals` is keyed by
/// seat index, so it only ever refers to existing seats, and the pool is
/// `entry_fee * participants.len()` until the round is drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    participants: Vec<Participant>,
    reveals: BTreeMap<usize, Secret>,
    pool: Amount,
}

impl Default for Round {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
            reveals: BTreeMap::new(),
            pool: Amount::ZERO,
        }
    }
}

impl Round {
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    pub fn revealed_count(&self) -> usize {
        self.reveals.len()
    }

    pub fn pool(&self) -> Amount {
        self.pool
    }

    pub fn contains(&self, identity: &Identity) -> bool {
        self.participants.iter().any(|p| p.identity() == identity)
    }

    /// Seats held by `identity`, with their index
    pub fn seats_of<'a>(
        &'a self,
        identity: &'a Identity,
    ) -> impl Iterator<Item = (usize, &'a Participant)> + 'a {
        self.participants
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.identity() == identity)
    }

    pub fn is_seat_revealed(&self, seat: usize) -> bool {
        self.reveals.contains_key(&seat)
    }

    /// True if any seat of `identity` has been revealed
    pub fn is_revealed(&self, identity: &Identity) -> bool {
        self.seats_of(identity)
            .any(|(seat, _)| self.is_seat_revealed(seat))
    }

    pub(crate) fn add_participant(&mut self, participant: Participant, fee: Amount) -> Result<()> {
        let pool = self
            .pool
            .checked_add(fee)
            .ok_or_else(|| LotteryError::invalid_input("pool overflow"))?;

        self.participants.push(participant);
        self.pool = pool;
        Ok(())
    }

    /// Returns `false` if the seat is out of range or already revealed
    pub(crate) fn record_reveal(&mut self, seat: usize, secret: Secret) -> bool {
        if seat >= self.participants.len() || self.reveals.contains_key(&seat) {
            return false;
        }
        self.reveals.insert(seat, secret);
        true
    }

    /// Revealed seats with their secrets, in join order
    pub fn revealed_in_join_order(&self) -> Vec<(Identity, Secret)> {
        self.revealed_seats()
            .map(|(participant, secret)| (*participant.identity(), *secret))
            .collect()
    }

    /// Revealed seats paired with the participant that holds them
    pub(crate) fn revealed_seats(&self) -> impl Iterator<Item = (&Participant, &Secret)> {
        self.reveals
            .iter()
            .filter_map(|(&seat, secret)| self.participants.get(seat).map(|p| (p, secret)))
    }

    /// Structural invariants that a restored round must satisfy
    pub(crate) fn check_invariants(&self, entry_fee: Amount) -> Result<()> {
        let expected = entry_fee
            .checked_mul(self.participants.len() as u64)
            .ok_or_else(|| LotteryError::invalid_input("pool overflow"))?;
        if self.pool != expected {
            return Err(LotteryError::invalid_input(format!(
                "pool holds {} sats but {} seats at {} sats require {} sats",
                self.pool.to_sat(),
                self.participants.len(),
                entry_fee.to_sat(),
                expected.to_sat()
            )));
        }

        if let Some((&seat, _)) = self
            .reveals
            .iter()
            .find(|&(&seat, _)| seat >= self.participants.len())
        {
            return Err(LotteryError::invalid_input(format!(
                "reveal for seat {} but the round has {} seats",
                seat,
                self.participants.len()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommitmentHash;

    fn fee() -> Amount {
        Amount::from_sat(2_000_000)
    }

    #[test]
    fn test_seats_per_identity() {
        let alice = Identity::random();
        let bob = Identity::random();
        let mut round = Round::default();
        round
            .add_participant(Participant::new(alice, CommitmentHash::new([1; 32])), fee())
            .unwrap();
        round
            .add_participant(Participant::new(bob, CommitmentHash::new([2; 32])), fee())
            .unwrap();
        round
            .add_participant(Participant::new(bob, CommitmentHash::new([3; 32])), fee())
            .unwrap();

        let bob_seats: Vec<usize> = round.seats_of(&bob).map(|(seat, _)| seat).collect();
        assert_eq!(bob_seats, vec![1, 2]);
        assert_eq!(round.pool(), fee() * 3);

        assert!(round.record_reveal(2, Secret::from(5u64)));
        assert!(!round.record_reveal(2, Secret::from(5u64)));
        assert!(!round.record_reveal(3, Secret::from(5u64)));
        assert!(round.is_revealed(&bob));
        assert!(!round.is_revealed(&alice));
        assert_eq!(round.revealed_in_join_order(), vec![(bob, Secret::from(5u64))]);
        assert!(round.check_invariants(fee()).is_ok());
    }

    #[test]
    fn test_check_invariants_detects_wrong_pool() {
        let mut round = Round::default();
        round
            .add_participant(
                Participant::new(Identity::random(), CommitmentHash::new([1; 32])),
                fee(),
            )
            .unwrap();

        assert!(matches!(
            round.check_invariants(Amount::from_sat(1_000_000)),
            Err(LotteryError::InvalidInput(_))
        ));
    }
}
