use crate::commitment::{verify, winner_index, xor_secrets, CommitmentScheme, HashPrimitive, Sha256Hash};
use crate::config::{validate_max_participants, LotteryConfig};
use crate::error::{LotteryError, Result};
use crate::events::{EventSink, LotteryEvent, LotteryRunFinished};
use crate::guard;
use crate::participant::Participant;
use crate::payout::PayoutHandler;
use crate::round::Round;
use crate::types::{CommitmentHash, Identity, Secret};
use bitcoin::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of the last completed round, overwritten by the next draw
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastLotteryResult {
    pub winner: Identity,
    pub payout: Amount,
    pub round_id: u64,
    pub participant_count: usize,
    pub revealed_count: usize,
    pub random: Secret,
    pub completed_at: DateTime<Utc>,
}

/// Result of a `submit_secret` call; none of these is an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    Accepted,
    AlreadyRevealed,
    /// No commitment for the caller, or the secret does not hash to it
    Ignored,
}

/// Everything the engine owns except its collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryState {
    pub id: Uuid,
    pub owner: Identity,
    pub config: LotteryConfig,
    pub round: Round,
    /// Sequence number of the round currently open, starting at 1
    pub round_id: u64,
    pub last_result: Option<LastLotteryResult>,
}

/// Lottery info for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotteryInfo {
    pub id: Uuid,
    pub owner: Identity,
    pub max_participants: usize,
    pub entry_fee: Amount,
    pub commitment_scheme: CommitmentScheme,
    pub round_id: u64,
    pub participant_count: usize,
    pub revealed_count: usize,
    pub pool: Amount,
}

/// Commit-reveal lottery engine.
///
/// Every method runs to completion with `&mut self`, so a payout handler or
/// event sink can never re-enter the engine during a draw.
#[derive(Debug)]
pub struct Lottery<P, E, H = Sha256Hash> {
    state: LotteryState,
    payout: P,
    events: E,
    hasher: H,
}

impl<P: PayoutHandler, E: EventSink> Lottery<P, E> {
    pub fn new(owner: Identity, config: LotteryConfig, payout: P, events: E) -> Result<Self> {
        Self::with_hasher(owner, config, payout, events, Sha256Hash)
    }

    /// Rebuild an engine from a previously taken snapshot
    pub fn restore(state: LotteryState, payout: P, events: E) -> Result<Self> {
        Self::restore_with_hasher(state, payout, events, Sha256Hash)
    }
}

impl<P: PayoutHandler, E: EventSink, H: HashPrimitive> Lottery<P, E, H> {
    pub fn with_hasher(
        owner: Identity,
        config: LotteryConfig,
        payout: P,
        events: E,
        hasher: H,
    ) -> Result<Self> {
        config.validate()?;

        let state = LotteryState {
            id: Uuid::new_v4(),
            owner,
            config,
            round: Round::default(),
            round_id: 1,
            last_result: None,
        };

        tracing::info!(
            "Lottery {} created by {} ({} sats entry, {} seats)",
            state.id,
            owner,
            state.config.entry_fee.to_sat(),
            state.config.max_participants
        );

        Ok(Self {
            state,
            payout,
            events,
            hasher,
        })
    }

    /// Rejects snapshots whose pool disagrees with the seats paid for, or
    /// whose reveals do not open their seat's commitment
    pub fn restore_with_hasher(state: LotteryState, payout: P, events: E, hasher: H) -> Result<Self> {
        state.config.validate()?;
        state.round.check_invariants(state.config.entry_fee)?;

        let scheme = state.config.commitment_scheme;
        for (participant, secret) in state.round.revealed_seats() {
            if !verify(scheme, &hasher, participant.commitment(), secret, participant.identity()) {
                return Err(LotteryError::invalid_input(format!(
                    "revealed secret of {} does not match its commitment",
                    participant.identity()
                )));
            }
        }

        Ok(Self {
            state,
            payout,
            events,
            hasher,
        })
    }

    pub fn id(&self) -> Uuid {
        self.state.id
    }

    pub fn owner(&self) -> &Identity {
        &self.state.owner
    }

    pub fn max_participants(&self) -> usize {
        self.state.config.max_participants
    }

    pub fn entry_fee(&self) -> Amount {
        self.state.config.entry_fee
    }

    pub fn commitment_scheme(&self) -> CommitmentScheme {
        self.state.config.commitment_scheme
    }

    pub fn round_id(&self) -> u64 {
        self.state.round_id
    }

    /// Value currently held for the round
    pub fn pool(&self) -> Amount {
        self.state.round.pool()
    }

    pub fn participants(&self) -> &[Participant] {
        self.state.round.participants()
    }

    pub fn current_count(&self) -> usize {
        self.state.round.participant_count()
    }

    pub fn current_submitted_count(&self) -> usize {
        self.state.round.revealed_count()
    }

    pub fn is_joined(&self, caller: &Identity) -> bool {
        self.state.round.contains(caller)
    }

    pub fn is_wallet_submitted_hash(&self, caller: &Identity) -> bool {
        self.state.round.is_revealed(caller)
    }

    pub fn last_lottery(&self) -> Result<&LastLotteryResult> {
        self.state
            .last_result
            .as_ref()
            .ok_or(LotteryError::NoCompletedRounds)
    }

    pub fn snapshot(&self) -> &LotteryState {
        &self.state
    }

    pub fn payout_handler(&self) -> &P {
        &self.payout
    }

    pub fn payout_handler_mut(&mut self) -> &mut P {
        &mut self.payout
    }

    pub fn event_sink(&self) -> &E {
        &self.events
    }

    pub fn into_parts(self) -> (LotteryState, P, E) {
        (self.state, self.payout, self.events)
    }

    pub fn info(&self) -> LotteryInfo {
        LotteryInfo {
            id: self.state.id,
            owner: self.state.owner,
            max_participants: self.state.config.max_participants,
            entry_fee: self.state.config.entry_fee,
            commitment_scheme: self.state.config.commitment_scheme,
            round_id: self.state.round_id,
            participant_count: self.current_count(),
            revealed_count: self.current_submitted_count(),
            pool: self.pool(),
        }
    }

    /// Change the seat limit; applies to the round in progress. A limit below
    /// the current participant count is accepted and only blocks new joins.
    pub fn configure(&mut self, caller: &Identity, max_participants: usize) -> Result<()> {
        guard::require_owner(&self.state.owner, caller)?;
        validate_max_participants(max_participants)?;

        self.state.config.max_participants = max_participants;
        tracing::info!(
            "Lottery {} max participants set to {}",
            self.state.id,
            max_participants
        );
        Ok(())
    }

    /// Take a seat in the current round with `commitment`, paying exactly the
    /// entry fee. A wallet that joins again takes an additional seat.
    pub fn join(&mut self, caller: &Identity, commitment: CommitmentHash, value: Amount) -> Result<()> {
        let config = &self.state.config;
        guard::require_exact_fee(config.entry_fee, value)?;
        guard::require_capacity(self.state.round.participant_count(), config.max_participants)?;

        let fee = config.entry_fee;
        self.state
            .round
            .add_participant(Participant::new(*caller, commitment), fee)?;

        tracing::info!(
            "{} joined lottery {} round {} ({}/{})",
            caller,
            self.state.id,
            self.state.round_id,
            self.state.round.participant_count(),
            self.state.config.max_participants
        );
        Ok(())
    }

    /// Reveal the secret behind one of the caller's seats. The first
    /// unrevealed seat whose commitment matches is revealed; wrong secrets and
    /// callers without a seat leave the round untouched.
    pub fn submit_secret(&mut self, caller: &Identity, secret: Secret) -> RevealOutcome {
        if !self.state.round.contains(caller) {
            tracing::debug!("Ignoring reveal from {}: not a participant", caller);
            return RevealOutcome::Ignored;
        }

        let scheme = self.state.config.commitment_scheme;
        let round = &self.state.round;
        let matching: Vec<usize> = round
            .seats_of(caller)
            .filter(|(_, p)| verify(scheme, &self.hasher, p.commitment(), &secret, caller))
            .map(|(seat, _)| seat)
            .collect();

        if matching.is_empty() {
            tracing::debug!("Ignoring reveal from {}: secret does not match", caller);
            return RevealOutcome::Ignored;
        }

        let Some(seat) = matching
            .into_iter()
            .find(|&seat| !round.is_seat_revealed(seat))
        else {
            return RevealOutcome::AlreadyRevealed;
        };

        self.state.round.record_reveal(seat, secret);

        tracing::info!(
            "{} revealed seat {} in lottery {} ({}/{} revealed)",
            caller,
            seat,
            self.state.id,
            self.state.round.revealed_count(),
            self.state.round.participant_count()
        );
        RevealOutcome::Accepted
    }

    /// Draw the winner among revealers and pay them the whole pool.
    ///
    /// The round is detached before the transfer and put back untouched if
    /// the transfer fails, in which case no event is emitted.
    pub fn run_lottery(&mut self, caller: &Identity) -> Result<LastLotteryResult> {
        guard::require_owner(&self.state.owner, caller)?;

        let revealed = self.state.round.revealed_in_join_order();
        let random = xor_secrets(revealed.iter().map(|(_, secret)| secret));
        let index =
            winner_index(&random, revealed.len()).ok_or(LotteryError::NoRevealedSecrets)?;
        let winner = revealed[index].0;

        let round = std::mem::take(&mut self.state.round);
        let payout = round.pool();

        if let Err(e) = self.payout.pay(&winner, payout) {
            self.state.round = round;
            tracing::warn!(
                "Lottery {} payout of {} sats to {} failed: {}",
                self.state.id,
                payout.to_sat(),
                winner,
                e
            );
            return Err(LotteryError::payout_failed(e));
        }

        let result = LastLotteryResult {
            winner,
            payout,
            round_id: self.state.round_id,
            participant_count: round.participant_count(),
            revealed_count: revealed.len(),
            random,
            completed_at: Utc::now(),
        };
        self.state.round_id += 1;
        self.state.last_result = Some(result.clone());

        self.events
            .emit(LotteryEvent::LotteryRunFinished(LotteryRunFinished {
                lottery_id: self.state.id,
                round_id: result.round_id,
                winner,
                payout,
                participant_count: result.participant_count,
                random,
                timestamp: result.completed_at,
            }));

        tracing::info!(
            "Lottery {} round {} completed. Winner: {} ({} sats)",
            self.state.id,
            result.round_id,
            winner,
            payout.to_sat()
        );
        Ok(result)
    }
}
