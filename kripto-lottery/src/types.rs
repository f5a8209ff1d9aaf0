use crate::error::{LotteryError, Result};
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::BitXor;
use std::str::FromStr;

/// Wallet-style participant address, `0x`-prefixed hex on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity([u8; 20]);

impl Identity {
    pub const LEN: usize = 20;

    pub fn random() -> Self {
        let mut bytes = [0u8; 20];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Identity {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_fixed::<20>(s)
            .map_err(|e| LotteryError::invalid_input(format!("identity '{}': {}", s, e)))?;
        Ok(Self(bytes))
    }
}

/// 256-bit unsigned secret, big-endian
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Secret([u8; 32]);

impl Secret {
    pub const ZERO: Secret = Secret([0u8; 32]);

    pub fn from_be_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn random() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }

    /// Exact `self mod modulus` over the full 256 bits, `None` for a zero
    /// modulus
    pub fn rem(&self, modulus: u64) -> Option<u64> {
        if modulus == 0 {
            return None;
        }
        let m = modulus as u128;
        let rem = self
            .0
            .iter()
            .fold(0u128, |acc, &byte| ((acc << 8) | byte as u128) % m);
        Some(rem as u64)
    }

    fn parse_decimal(s: &str) -> Option<Self> {
        if s.is_empty() {
            return None;
        }
        let mut out = [0u8; 32];
        for c in s.chars() {
            let digit = c.to_digit(10)?;
            let mut carry = digit;
            for byte in out.iter_mut().rev() {
                let v = (*byte as u32) * 10 + carry;
                *byte = (v & 0xff) as u8;
                carry = v >> 8;
            }
            if carry != 0 {
                return None;
            }
        }
        Some(Self(out))
    }

    fn to_decimal(&self) -> String {
        let mut digits = Vec::new();
        let mut n = self.0;
        while n.iter().any(|&b| b != 0) {
            let mut rem = 0u32;
            for byte in n.iter_mut() {
                let v = (rem << 8) | *byte as u32;
                *byte = (v / 10) as u8;
                rem = v % 10;
            }
            digits.push(char::from(b'0' + rem as u8));
        }
        if digits.is_empty() {
            return "0".to_string();
        }
        digits.iter().rev().collect()
    }
}

impl From<u64> for Secret {
    fn from(value: u64) -> Self {
        Self::from(value as u128)
    }
}

impl From<u128> for Secret {
    fn from(value: u128) -> Self {
        let mut bytes = [0u8; 32];
        bytes[16..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }
}

impl BitXor for Secret {
    type Output = Secret;

    fn bitxor(self, rhs: Secret) -> Secret {
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.0[i] ^ rhs.0[i];
        }
        Secret(out)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_decimal())
    }
}

/// Accepts decimal digits or `0x` hex of up to 64 digits
impl FromStr for Secret {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(hex_digits) = s.strip_prefix("0x") {
            if hex_digits.is_empty() || hex_digits.len() > 64 {
                return Err(LotteryError::invalid_input(format!(
                    "secret '{}': expected 1 to 64 hex digits",
                    s
                )));
            }
            let padded = format!("{:0>64}", hex_digits);
            let bytes = decode_fixed::<32>(&padded)
                .map_err(|e| LotteryError::invalid_input(format!("secret '{}': {}", s, e)))?;
            return Ok(Self(bytes));
        }
        Self::parse_decimal(s).ok_or_else(|| {
            LotteryError::invalid_input(format!("secret '{}' is not a 256-bit number", s))
        })
    }
}

/// Digest a participant commits to at join time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommitmentHash([u8; 32]);

impl CommitmentHash {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for CommitmentHash {
    type Err = LotteryError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = decode_fixed::<32>(s)
            .map_err(|e| LotteryError::invalid_input(format!("commitment '{}': {}", s, e)))?;
        Ok(Self(bytes))
    }
}

fn decode_fixed<const N: usize>(s: &str) -> std::result::Result<[u8; N], String> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("expected {} bytes, got {}", N, b.len()))
}

// string-encoded so they can key JSON maps
macro_rules! serde_via_str {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

serde_via_str!(Identity);
serde_via_str!(Secret);
serde_via_str!(CommitmentHash);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_decimal_roundtrip() {
        let secret: Secret = "9998".parse().unwrap();
        assert_eq!(secret, Secret::from(9998u64));
        assert_eq!(secret.to_string(), "9998");
        assert_eq!(Secret::ZERO.to_string(), "0");

        let max = Secret::from_be_bytes([0xff; 32]);
        let text = max.to_string();
        assert_eq!(text.parse::<Secret>().unwrap(), max);
    }

    #[test]
    fn test_secret_rejects_overflow_and_garbage() {
        // 2^256
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(too_big.parse::<Secret>().is_err());
        assert!("12a".parse::<Secret>().is_err());
        assert!("".parse::<Secret>().is_err());
    }

    #[test]
    fn test_secret_hex_parsing() {
        let secret: Secret = "0x270e".parse().unwrap();
        assert_eq!(secret, Secret::from(9998u64));
    }

    #[test]
    fn test_secret_xor_and_rem() {
        let x = Secret::from(9998u64) ^ Secret::from(1231u64) ^ Secret::from(1128u64);
        assert_eq!(x, Secret::from(9998u64 ^ 1231 ^ 1128));
        assert_eq!(x.rem(3), Some((9998u64 ^ 1231 ^ 1128) % 3));
        assert_eq!(x.rem(0), None);

        let high = Secret::from_be_bytes([0xff; 32]);
        // 2^256 - 1 is divisible by 3 and 5
        assert_eq!(high.rem(3), Some(0));
        assert_eq!(high.rem(5), Some(0));
        assert_eq!(high.rem(7), Some(1));
    }

    #[test]
    fn test_identity_parse_display() {
        let id = Identity::random();
        let parsed: Identity = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("0x1234".parse::<Identity>().is_err());
    }
}
