//! Identity-gated, privacy-preserving election core.
//!
//! Voters prove eligibility through a zero-knowledge credential check, then
//! register an anonymous commitment into an append-only incremental Merkle
//! registry. A vote is cast later by presenting a zero-knowledge membership
//! proof whose public signals expose only a claimed Merkle root and a
//! one-time nullifier, so a ballot is never linkable to the registration
//! that authorized it.
//!
//! The crate is the election state machine plus its two cryptographic
//! subsystems:
//!
//! - [`merkle::CommitmentRegistry`], the commitment accumulator, with
//!   historical-root validation so proofs built against a slightly stale
//!   tree state remain acceptable;
//! - [`credential::CredentialGate`] and [`ballot::BallotGate`], the two
//!   independent verification gates, each delegating the cryptographic
//!   verdict to an injected capability and failing closed on malformed
//!   input;
//! - [`election::Election`], the owned aggregate orchestrating the
//!   phase-gated `register_to_vote` and `vote` operations.
//!
//! The concrete proof systems are external collaborators: implement
//! [`ballot::BallotVerifier`] and [`credential::CredentialValidator`] to
//! wire them in. Execution is single-threaded and transactional per call;
//! phase is recomputed from the caller-supplied clock on every operation.

pub mod ballot;
pub mod credential;
pub mod election;
pub mod error;
pub mod event;
pub mod field;
pub mod merkle;
pub mod phase;
pub mod testing;

pub use ballot::{BallotProof, BallotVerifier};
pub use credential::{CredentialQuery, CredentialValidator, Operator, QueryDescriptor};
pub use election::{Address, Contestant, Election, ElectionConfig, ElectionSummary, VoterRecord};
pub use error::{ConfigError, ElectionError, GatedAction};
pub use event::Event;
pub use field::Fr;
pub use merkle::CommitmentRegistry;
pub use phase::{ElectionSchedule, Phase};
