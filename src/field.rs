//! BN254 scalar field elements and the fixed two-input hash.
//!
//! Commitments, Merkle roots, nullifiers and proof public signals are all
//! scalars of the BN254 proving curve. They are carried as 32 canonical
//! big-endian bytes; any bytes accepted from the outside are checked against
//! the field modulus so that out-of-field values are unrepresentable further
//! down the pipeline.
//!
//! The node hash is Blake2s-256 with a domain tag, clamped to 253 bits so
//! every output is itself a valid scalar (2^253 is below the BN254 modulus).

use std::fmt;

use blake2::{Blake2s256, Digest};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Width of a serialized field element.
pub const FR_BYTES: usize = 32;

/// BN254 scalar field modulus, big-endian:
/// 21888242871839275222246405745257275088548364400416034343698204186575808495617.
const MODULUS_BE: [u8; FR_BYTES] = [
    0x30, 0x64, 0x4e, 0x72, 0xe1, 0x31, 0xa0, 0x29, 0xb8, 0x50, 0x45, 0xb6, 0x81, 0x81, 0x58,
    0x5d, 0x28, 0x33, 0xe8, 0x48, 0x79, 0xb9, 0x70, 0x91, 0x43, 0xe1, 0xf5, 0x93, 0xf0, 0x00,
    0x00, 0x01,
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("value is not a canonical BN254 scalar")]
    NotInField,
    #[error("invalid hex encoding: {0}")]
    InvalidHex(String),
}

/// A BN254 scalar in canonical big-endian form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Fr([u8; FR_BYTES]);

impl Fr {
    pub const ZERO: Fr = Fr([0u8; FR_BYTES]);

    /// Parse canonical big-endian bytes, rejecting values at or above the
    /// field modulus.
    pub fn from_be_bytes(bytes: [u8; FR_BYTES]) -> Result<Self, FieldError> {
        if bytes >= MODULUS_BE {
            return Err(FieldError::NotInField);
        }
        Ok(Fr(bytes))
    }

    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; FR_BYTES];
        bytes[FR_BYTES - 8..].copy_from_slice(&value.to_be_bytes());
        Fr(bytes)
    }

    /// Parse a hex string, with or without a `0x` prefix, left-padding short
    /// inputs with zeroes.
    pub fn from_hex(input: &str) -> Result<Self, FieldError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        let raw = hex::decode(digits).map_err(|e| FieldError::InvalidHex(e.to_string()))?;
        if raw.len() > FR_BYTES {
            return Err(FieldError::InvalidHex(format!(
                "expected at most {} bytes, got {}",
                FR_BYTES,
                raw.len()
            )));
        }
        let mut bytes = [0u8; FR_BYTES];
        bytes[FR_BYTES - raw.len()..].copy_from_slice(&raw);
        Self::from_be_bytes(bytes)
    }

    pub fn to_be_bytes(self) -> [u8; FR_BYTES] {
        self.0
    }

    pub fn to_hex(self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl From<u64> for Fr {
    fn from(value: u64) -> Self {
        Fr::from_u64(value)
    }
}

impl fmt::Display for Fr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Fr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fr").field(&self.to_hex()).finish()
    }
}

impl Serialize for Fr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Fr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Fr::from_hex(&text).map_err(de::Error::custom)
    }
}

/// Domain-separated hash of a sequence of scalars, clamped into the field.
pub fn hash_many(domain: &[u8], parts: &[Fr]) -> Fr {
    let mut hasher = Blake2s256::new();
    hasher.update(domain);
    for part in parts {
        hasher.update(part.0);
    }
    let mut out: [u8; FR_BYTES] = hasher.finalize().into();
    // Clamp to 253 bits: 2^253 < the BN254 scalar modulus.
    out[0] &= 0x1f;
    Fr(out)
}

/// The fixed two-input hash used for Merkle tree nodes.
pub fn hash_pair(left: &Fr, right: &Fr) -> Fr {
    hash_many(b"zk-election.node.v1", &[*left, *right])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modulus_boundary_is_rejected() {
        assert_eq!(Fr::from_be_bytes(MODULUS_BE), Err(FieldError::NotInField));

        let mut below = MODULUS_BE;
        below[FR_BYTES - 1] = 0x00;
        assert!(Fr::from_be_bytes(below).is_ok());

        let max = [0xffu8; FR_BYTES];
        assert_eq!(Fr::from_be_bytes(max), Err(FieldError::NotInField));
    }

    #[test]
    fn hex_round_trip() {
        let fr = Fr::from_u64(123);
        assert_eq!(fr.to_hex().len(), 2 + 2 * FR_BYTES);
        assert_eq!(Fr::from_hex(&fr.to_hex()), Ok(fr));
        assert_eq!(Fr::from_hex("0x7b"), Ok(fr));
        assert_eq!(Fr::from_hex("7b"), Ok(fr));
    }

    #[test]
    fn hex_rejects_garbage() {
        assert!(matches!(Fr::from_hex("0xzz"), Err(FieldError::InvalidHex(_))));
        let too_long = format!("0x{}", "00".repeat(FR_BYTES + 1));
        assert!(matches!(Fr::from_hex(&too_long), Err(FieldError::InvalidHex(_))));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let fr = Fr::from_u64(7);
        let json = serde_json::to_string(&fr).unwrap();
        assert!(json.contains("0x"));
        let back: Fr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fr);

        let oversized = format!("\"0x{}\"", hex::encode(MODULUS_BE));
        assert!(serde_json::from_str::<Fr>(&oversized).is_err());
    }

    #[test]
    fn hash_pair_is_in_field_and_order_sensitive() {
        let a = Fr::from_u64(1);
        let b = Fr::from_u64(2);
        let ab = hash_pair(&a, &b);
        let ba = hash_pair(&b, &a);
        assert_ne!(ab, ba);
        assert!(Fr::from_be_bytes(ab.to_be_bytes()).is_ok());
        assert_eq!(ab, hash_pair(&a, &b));
    }
}
