//! Test doubles for the injected verifier and validator capabilities.
//!
//! The mocks hand back a shared flag so a test can flip the verdict after
//! the election has taken ownership of the capability, mirroring how a
//! deployed mock verifier gets toggled between calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::ballot::{BallotProof, BallotVerifier};
use crate::credential::{CredentialQuery, CredentialValidator};
use crate::election::Address;
use crate::field::Fr;

pub struct MockBallotVerifier {
    verdict: Arc<AtomicBool>,
}

impl MockBallotVerifier {
    /// Returns the verifier and the handle controlling its verdict.
    pub fn new(initial: bool) -> (Box<dyn BallotVerifier>, Arc<AtomicBool>) {
        let verdict = Arc::new(AtomicBool::new(initial));
        let verifier = MockBallotVerifier {
            verdict: Arc::clone(&verdict),
        };
        (Box::new(verifier), verdict)
    }
}

impl BallotVerifier for MockBallotVerifier {
    fn verify(&self, _proof: &BallotProof, _public_signals: &[Fr]) -> bool {
        self.verdict.load(Ordering::Relaxed)
    }
}

pub struct MockCredentialValidator {
    verdict: Arc<AtomicBool>,
}

impl MockCredentialValidator {
    pub fn new(initial: bool) -> (Box<dyn CredentialValidator>, Arc<AtomicBool>) {
        let verdict = Arc::new(AtomicBool::new(initial));
        let validator = MockCredentialValidator {
            verdict: Arc::clone(&verdict),
        };
        (Box::new(validator), verdict)
    }
}

impl CredentialValidator for MockCredentialValidator {
    fn validate(&self, _query: &CredentialQuery, _subject: &Address, _signals: &[Fr]) -> bool {
        self.verdict.load(Ordering::Relaxed)
    }
}
