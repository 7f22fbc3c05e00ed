//! Error taxonomy for the election core.
//!
//! Every rejection carries a distinct, caller-attributable reason. A rejected
//! call has no side effects; nothing here is fatal to the aggregate.

use std::fmt;

use thiserror::Error;

/// The two phase-gated entry points, used to attribute `PhaseError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatedAction {
    Registration,
    Voting,
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatedAction::Registration => f.write_str("Registration"),
            GatedAction::Voting => f.write_str("Voting"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ElectionError {
    /// The action was attempted outside its legal time window.
    #[error("{0} is not open")]
    PhaseError(GatedAction),

    /// Registration requires a prior successful credential check.
    #[error("KYC verification required before registering")]
    NotCleared,

    /// The credential validator returned a negative verdict.
    #[error("credential validator rejected the response")]
    CredentialRejected,

    /// No credential query has been configured under this request id.
    #[error("no credential query configured for request id {0}")]
    UnknownQuery(u64),

    #[error("Voter already registered")]
    AlreadyRegistered,

    #[error("Vote already cast")]
    AlreadyVoted,

    /// `max_voters` registrations have already been accepted.
    #[error("maximum number of voters reached")]
    ElectionFull,

    /// The Merkle registry has no free leaf slots left.
    #[error("commitment registry is full")]
    RegistryFull,

    /// The proof's claimed root is neither current nor in the retained history.
    #[error("proof does not reference a known Merkle root")]
    UnknownRoot,

    /// Malformed input or a negative verdict from the ballot verifier.
    #[error("ballot proof rejected")]
    InvalidProof,

    #[error("contestant {index} does not exist ({count} contestants)")]
    InvalidContestant { index: u32, count: u32 },
}

/// Construction-time parameter rejection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("registration window is empty or inverted")]
    RegistrationWindow,

    #[error("voting must start at or after registration ends")]
    WindowOverlap,

    #[error("voting window is empty or inverted")]
    VotingWindow,

    #[error("tree depth {0} outside supported range 1..=32")]
    DepthOutOfRange(u32),

    #[error("max voters {max_voters} exceeds registry capacity {capacity}")]
    CapacityExceeded { max_voters: u64, capacity: u64 },

    #[error("contestant list is empty")]
    NoContestants,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_errors_keep_legacy_messages() {
        assert_eq!(
            ElectionError::PhaseError(GatedAction::Registration).to_string(),
            "Registration is not open"
        );
        assert_eq!(
            ElectionError::PhaseError(GatedAction::Voting).to_string(),
            "Voting is not open"
        );
        assert_eq!(
            ElectionError::AlreadyRegistered.to_string(),
            "Voter already registered"
        );
        assert_eq!(ElectionError::AlreadyVoted.to_string(), "Vote already cast");
    }
}
