use crate::types::{Identity, Secret};
use bitcoin::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryRunFinished {
    pub lottery_id: Uuid,
    pub round_id: u64,
    pub winner: Identity,
    pub payout: Amount,
    pub participant_count: usize,
    pub random: Secret,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LotteryEvent {
    LotteryRunFinished(LotteryRunFinished),
}

/// Receives events after the state change they describe is final
pub trait EventSink {
    fn emit(&mut self, event: LotteryEvent);
}

/// Append-only in-memory log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<LotteryEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn run_finished(&self) -> impl Iterator<Item = &LotteryRunFinished> {
        self.events.iter().map(|event| match event {
            LotteryEvent::LotteryRunFinished(finished) => finished,
        })
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: LotteryEvent) {
        self.events.push(event);
    }
}
