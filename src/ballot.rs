//! Ballot proof gate.
//!
//! The gate accepts a Groth16-style proof tuple and its public signals,
//! checks the fixed signal layout, and delegates the cryptographic verdict
//! to the injected verifier. It fails closed: malformed input is rejected
//! before delegation, and out-of-field signal values are unrepresentable by
//! construction of [`Fr`].

use serde::{Deserialize, Serialize};

use crate::error::ElectionError;
use crate::field::Fr;

/// Fixed position of the claimed Merkle root in the public signals.
pub const SIGNAL_ROOT: usize = 0;
/// Fixed position of the one-time identity tag (nullifier).
pub const SIGNAL_NULLIFIER: usize = 1;
/// Exact public-signal arity the ballot circuit exposes.
pub const SIGNAL_COUNT: usize = 2;

/// Groth16-style proof elements as submitted by the voter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BallotProof {
    pub a: [Fr; 2],
    pub b: [[Fr; 2]; 2],
    pub c: [Fr; 2],
}

/// External pairing-based verifier for the ballot circuit, injected at
/// election construction. Returns a strict verdict; the core never depends
/// on its internals.
pub trait BallotVerifier {
    fn verify(&self, proof: &BallotProof, public_signals: &[Fr]) -> bool;
}

/// The two fixed-position signals the orchestrator's guards need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicSignals {
    claimed_root: Fr,
    nullifier: Fr,
}

impl PublicSignals {
    /// Validate arity and extract the fixed-position signals.
    pub fn parse(signals: &[Fr]) -> Result<Self, ElectionError> {
        if signals.len() != SIGNAL_COUNT {
            return Err(ElectionError::InvalidProof);
        }
        Ok(PublicSignals {
            claimed_root: signals[SIGNAL_ROOT],
            nullifier: signals[SIGNAL_NULLIFIER],
        })
    }

    pub fn claimed_root(&self) -> Fr {
        self.claimed_root
    }

    pub fn nullifier(&self) -> Fr {
        self.nullifier
    }
}

pub struct BallotGate {
    verifier: Box<dyn BallotVerifier>,
}

impl BallotGate {
    pub fn new(verifier: Box<dyn BallotVerifier>) -> Self {
        BallotGate { verifier }
    }

    /// Delegate to the verifier; a negative verdict or malformed arity is
    /// `InvalidProof`.
    pub fn verify(&self, proof: &BallotProof, signals: &[Fr]) -> Result<(), ElectionError> {
        if signals.len() != SIGNAL_COUNT {
            return Err(ElectionError::InvalidProof);
        }
        if self.verifier.verify(proof, signals) {
            Ok(())
        } else {
            Err(ElectionError::InvalidProof)
        }
    }
}
