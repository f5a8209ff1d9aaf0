pub mod scheme;

pub use scheme::{CommitmentScheme, HashPrimitive, Sha256Hash};

use crate::types::{CommitmentHash, Identity, Secret};

/// Commitment a participant sends with `join`
pub fn commit<H: HashPrimitive + ?Sized>(
    scheme: CommitmentScheme,
    hasher: &H,
    secret: &Secret,
    identity: &Identity,
) -> CommitmentHash {
    hasher.hash(&scheme.preimage(secret, identity))
}

pub fn verify<H: HashPrimitive + ?Sized>(
    scheme: CommitmentScheme,
    hasher: &H,
    commitment: &CommitmentHash,
    secret: &Secret,
    identity: &Identity,
) -> bool {
    commit(scheme, hasher, secret, identity) == *commitment
}

/// XOR of every revealed secret.
///
/// This is NOT a secure random source: the last participant to reveal can
/// pick a secret that steers the result. Use it for auditable games only.
pub fn xor_secrets<'a, I>(secrets: I) -> Secret
where
    I: IntoIterator<Item = &'a Secret>,
{
    secrets.into_iter().fold(Secret::ZERO, |acc, s| acc ^ *s)
}

/// Index of the winner among `revealers` entries, `None` when nobody revealed
pub fn winner_index(random: &Secret, revealers: usize) -> Option<usize> {
    random
        .rem(revealers as u64)
        .map(|index| index as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commitment_scheme() {
        let secret = Secret::random();
        let alice = Identity::random();
        let bob = Identity::random();
        let commitment = commit(CommitmentScheme::IdentityBound, &Sha256Hash, &secret, &alice);

        assert!(verify(
            CommitmentScheme::IdentityBound,
            &Sha256Hash,
            &commitment,
            &secret,
            &alice
        ));
        assert!(!verify(
            CommitmentScheme::IdentityBound,
            &Sha256Hash,
            &commitment,
            &Secret::from(2021u64),
            &alice
        ));
        // bound to the committing identity
        assert!(!verify(
            CommitmentScheme::IdentityBound,
            &Sha256Hash,
            &commitment,
            &secret,
            &bob
        ));
    }

    #[test]
    fn test_bare_scheme_ignores_identity() {
        let secret = Secret::from(2022u64);
        let a = commit(CommitmentScheme::Bare, &Sha256Hash, &secret, &Identity::random());
        let b = commit(CommitmentScheme::Bare, &Sha256Hash, &secret, &Identity::random());
        assert_eq!(a, b);
        assert_ne!(
            a,
            commit(CommitmentScheme::IdentityBound, &Sha256Hash, &secret, &Identity::random())
        );
    }

    #[test]
    fn test_known_sha256_digest() {
        let hash = commit(CommitmentScheme::Bare, &Sha256Hash, &Secret::ZERO, &Identity::random());
        // sha256 of 32 zero bytes
        assert_eq!(
            hash.to_string(),
            "0x66687aadf862bd776c8fc18b8e9f8e20089714856ee233b3902a591d0d5f2925"
        );
    }

    #[test]
    fn test_winner_determination() {
        let secrets = [
            Secret::from(9998u64),
            Secret::from(1231u64),
            Secret::from(1128u64),
        ];
        let random = xor_secrets(&secrets);
        assert_eq!(random, Secret::from(9998u64 ^ 1231 ^ 1128));
        assert_eq!(
            winner_index(&random, 3),
            Some(((9998u64 ^ 1231 ^ 1128) % 3) as usize)
        );
        assert_eq!(winner_index(&random, 0), None);
        assert_eq!(xor_secrets(&[] as &[Secret]), Secret::ZERO);
    }
}
