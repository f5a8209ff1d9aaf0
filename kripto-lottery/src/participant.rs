use crate::types::{CommitmentHash, Identity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A joiner of the current round and the commitment it paid for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    identity: Identity,
    commitment: CommitmentHash,
    joined_at: DateTime<Utc>,
}

impl Participant {
    pub fn new(identity: Identity, commitment: CommitmentHash) -> Self {
        Self {
            identity,
            commitment,
            joined_at: Utc::now(),
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn commitment(&self) -> &CommitmentHash {
        &self.commitment
    }

    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}
