//! Single-round commit-reveal lottery
//!
//! Participants pay a fixed entry fee and commit to a hashed secret, later
//! reveal it, and the owner draws a winner from the XOR of the revealed
//! secrets. The winner receives every entry fee paid into the round.
//!
//! The XOR draw is auditable, not secure: the last participant to reveal can
//! bias it.

pub mod commitment;
pub mod config;
pub mod error;
pub mod events;
pub mod guard;
pub mod lottery;
pub mod participant;
pub mod payout;
pub mod round;
pub mod shared;
pub mod types;

pub use commitment::{commit, CommitmentScheme, HashPrimitive, Sha256Hash};
pub use config::{LotteryConfig, DEFAULT_ENTRY_FEE, DEFAULT_ENTRY_FEE_SATS, DEFAULT_MAX_PARTICIPANTS};
pub use error::{LotteryError, Result};
pub use events::{EventLog, EventSink, LotteryEvent, LotteryRunFinished};
pub use lottery::{LastLotteryResult, Lottery, LotteryInfo, LotteryState, RevealOutcome};
pub use participant::Participant;
pub use payout::{Ledger, PayoutHandler};
pub use round::Round;
pub use shared::SharedLottery;
pub use types::{CommitmentHash, Identity, Secret};

pub use bitcoin::Amount;
