use crate::types::{CommitmentHash, Identity, Secret};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Preimage-resistant hash the engine verifies reveals with
pub trait HashPrimitive {
    fn hash(&self, preimage: &[u8]) -> CommitmentHash;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hash;

impl HashPrimitive for Sha256Hash {
    fn hash(&self, preimage: &[u8]) -> CommitmentHash {
        let mut hasher = Sha256::new();
        hasher.update(preimage);
        CommitmentHash::new(hasher.finalize().into())
    }
}

/// How a secret is encoded before hashing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentScheme {
    /// `H(secret_be32 || identity_20)`; a commitment cannot be replayed by
    /// another identity
    #[default]
    IdentityBound,
    /// `H(secret_be32)`
    Bare,
}

impl CommitmentScheme {
    pub fn preimage(&self, secret: &Secret, identity: &Identity) -> Vec<u8> {
        let mut preimage = Vec::with_capacity(32 + Identity::LEN);
        preimage.extend_from_slice(&secret.to_be_bytes());
        if let CommitmentScheme::IdentityBound = self {
            preimage.extend_from_slice(identity.as_bytes());
        }
        preimage
    }
}
