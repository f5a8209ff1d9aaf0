use crate::types::Identity;
use bitcoin::Amount;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LotteryError>;

#[derive(Error, Debug)]
pub enum LotteryError {
    #[error("Unauthorized: {caller} is not the lottery owner")]
    Unauthorized { caller: Identity },

    #[error("Invalid payment: entry fee is {} sats, got {} sats", .expected.to_sat(), .got.to_sat())]
    InvalidPayment { expected: Amount, got: Amount },

    #[error("Round is full: {max} participants allowed")]
    RoundFull { max: usize },

    #[error("No revealed secrets in the current round")]
    NoRevealedSecrets,

    #[error("No completed rounds yet")]
    NoCompletedRounds,

    #[error("Payout failed: {0}")]
    PayoutFailed(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl LotteryError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn payout_failed(msg: impl Into<String>) -> Self {
        Self::PayoutFailed(msg.into())
    }
}
