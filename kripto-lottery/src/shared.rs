use crate::commitment::{HashPrimitive, Sha256Hash};
use crate::error::Result;
use crate::events::EventSink;
use crate::lottery::{LastLotteryResult, Lottery, RevealOutcome};
use crate::payout::PayoutHandler;
use crate::types::{CommitmentHash, Identity, Secret};
use bitcoin::Amount;
use parking_lot::Mutex;
use std::sync::Arc;

/// Engine handle for multi-threaded hosts. Each call holds the lock for its
/// whole duration, so a draw is indivisible relative to joins and reveals.
pub struct SharedLottery<P, E, H = Sha256Hash> {
    inner: Arc<Mutex<Lottery<P, E, H>>>,
}

impl<P, E, H> Clone for SharedLottery<P, E, H> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: PayoutHandler, E: EventSink, H: HashPrimitive> SharedLottery<P, E, H> {
    pub fn new(lottery: Lottery<P, E, H>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(lottery)),
        }
    }

    pub fn configure(&self, caller: &Identity, max_participants: usize) -> Result<()> {
        self.inner.lock().configure(caller, max_participants)
    }

    pub fn join(&self, caller: &Identity, commitment: CommitmentHash, value: Amount) -> Result<()> {
        self.inner.lock().join(caller, commitment, value)
    }

    pub fn submit_secret(&self, caller: &Identity, secret: Secret) -> RevealOutcome {
        self.inner.lock().submit_secret(caller, secret)
    }

    pub fn run_lottery(&self, caller: &Identity) -> Result<LastLotteryResult> {
        self.inner.lock().run_lottery(caller)
    }

    pub fn current_count(&self) -> usize {
        self.inner.lock().current_count()
    }

    pub fn current_submitted_count(&self) -> usize {
        self.inner.lock().current_submitted_count()
    }

    pub fn is_wallet_submitted_hash(&self, caller: &Identity) -> bool {
        self.inner.lock().is_wallet_submitted_hash(caller)
    }

    pub fn last_lottery(&self) -> Result<LastLotteryResult> {
        self.inner.lock().last_lottery().cloned()
    }

    /// Run `f` against the engine inside a single critical section
    pub fn with<R>(&self, f: impl FnOnce(&mut Lottery<P, E, H>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commitment::commit;
    use crate::config::LotteryConfig;
    use crate::error::LotteryError;
    use crate::events::EventLog;
    use crate::payout::Ledger;
    use std::thread;

    #[test]
    fn test_concurrent_joins_respect_capacity() {
        let owner = Identity::random();
        let fee = Amount::from_sat(2_000_000);
        let lottery = Lottery::new(owner, LotteryConfig::new(5, fee), Ledger::new(), EventLog::new())
            .unwrap();
        let shared = SharedLottery::new(lottery);

        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    let who = Identity::random();
                    let secret = Secret::from(i);
                    let commitment = commit(
                        shared.with(|l| l.commitment_scheme()),
                        &Sha256Hash,
                        &secret,
                        &who,
                    );
                    shared
                        .join(&who, commitment, fee)
                        .map(|_| shared.submit_secret(&who, secret))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let joined = results.iter().filter(|r| r.is_ok()).count();
        let full = results
            .iter()
            .filter(|r| matches!(r, Err(LotteryError::RoundFull { max: 5 })))
            .count();

        assert_eq!(joined, 5);
        assert_eq!(full, 3);
        assert_eq!(shared.current_count(), 5);
        assert_eq!(shared.current_submitted_count(), 5);
        assert!(results
            .iter()
            .flatten()
            .all(|outcome| *outcome == RevealOutcome::Accepted));
    }

    #[test]
    fn test_shared_draw_resets_round() {
        let owner = Identity::random();
        let lottery =
            Lottery::new(owner, LotteryConfig::default(), Ledger::new(), EventLog::new()).unwrap();
        let shared = SharedLottery::new(lottery);
        let who = Identity::random();
        let secret = Secret::from(3u64);

        let commitment = commit(shared.with(|l| l.commitment_scheme()), &Sha256Hash, &secret, &who);
        shared.with(|l| {
            let fee = l.entry_fee();
            let ledger = l.payout_handler_mut();
            ledger.credit(&who, fee).unwrap();
            ledger.deposit(&who, fee).unwrap();
        });
        shared
            .join(&who, commitment, Amount::from_sat(2_000_000))
            .unwrap();
        shared.submit_secret(&who, secret);

        let result = shared.run_lottery(&owner).unwrap();
        assert_eq!(result.winner, who);
        assert_eq!(shared.current_count(), 0);
        assert_eq!(shared.last_lottery().unwrap(), result);
        assert!(!shared.is_wallet_submitted_hash(&who));
    }
}
