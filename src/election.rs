//! The election aggregate and its orchestrated operations.
//!
//! One owned value holds the election metadata, the commitment registry, the
//! voter-status table, the credential gate, the nullifier set and the event
//! log; every mutation goes through `&mut self` on [`Election`], so calls are
//! serialized by construction. Each operation validates all guards before
//! touching state: a rejected call leaves no partial effect.

use std::collections::{HashMap, HashSet};
use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::ballot::{BallotGate, BallotProof, BallotVerifier, PublicSignals};
use crate::credential::{CredentialGate, CredentialQuery, CredentialValidator};
use crate::error::{ConfigError, ElectionError, GatedAction};
use crate::event::{Event, EventLog};
use crate::field::Fr;
use crate::merkle::CommitmentRegistry;
use crate::phase::{ElectionSchedule, Phase};

/// Opaque caller identity, as assigned by the surrounding execution
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(String);

impl Address {
    pub fn new(id: impl Into<String>) -> Self {
        Address(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Self {
        Address(id.to_owned())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contestant {
    pub name: String,
    pub vote_count: u64,
}

/// Registration audit record. Never used to link a cast vote back to the
/// commitment; voting replay is guarded by the nullifier set alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoterRecord {
    pub commitment: Fr,
    pub leaf_index: u64,
}

/// Construction parameters.
#[derive(Debug, Clone)]
pub struct ElectionConfig {
    pub title: String,
    /// Merkle tree depth; registry capacity is `2^depth` leaves.
    pub depth: u32,
    pub schedule: ElectionSchedule,
    pub max_voters: u64,
    pub contestants: Vec<String>,
    /// `None` retains every root ever published (the default baseline);
    /// `Some(n)` keeps only the `n` most recent.
    pub root_history_limit: Option<usize>,
}

/// Snapshot answered by the `election()` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionSummary {
    pub title: String,
    pub phase: Phase,
    pub schedule: ElectionSchedule,
    pub max_voters: u64,
    pub registered_voters_count: u64,
    pub contestant_count: u32,
}

pub struct Election {
    title: String,
    schedule: ElectionSchedule,
    max_voters: u64,
    contestants: Vec<Contestant>,
    registered_count: u64,
    registry: CommitmentRegistry,
    voters: HashMap<Address, VoterRecord>,
    credential: CredentialGate,
    nullifiers: HashSet<Fr>,
    ballot_gate: BallotGate,
    last_observed_phase: Phase,
    events: EventLog,
}

impl Election {
    /// Build the aggregate, rejecting inconsistent parameters.
    pub fn new(
        config: ElectionConfig,
        ballot_verifier: Box<dyn BallotVerifier>,
    ) -> Result<Self, ConfigError> {
        config.schedule.validate()?;
        if config.contestants.is_empty() {
            return Err(ConfigError::NoContestants);
        }
        let registry = match config.root_history_limit {
            Some(cap) => CommitmentRegistry::with_root_capacity(config.depth, cap)?,
            None => CommitmentRegistry::new(config.depth)?,
        };
        if config.max_voters > registry.capacity() {
            return Err(ConfigError::CapacityExceeded {
                max_voters: config.max_voters,
                capacity: registry.capacity(),
            });
        }
        info!(
            "election \"{}\" created: {} contestants, up to {} voters, {}",
            config.title,
            config.contestants.len(),
            config.max_voters,
            config.schedule
        );
        Ok(Election {
            title: config.title,
            schedule: config.schedule,
            max_voters: config.max_voters,
            contestants: config
                .contestants
                .into_iter()
                .map(|name| Contestant {
                    name,
                    vote_count: 0,
                })
                .collect(),
            registered_count: 0,
            registry,
            voters: HashMap::new(),
            credential: CredentialGate::new(),
            nullifiers: HashSet::new(),
            ballot_gate: BallotGate::new(ballot_verifier),
            last_observed_phase: Phase::Created,
            events: EventLog::new(),
        })
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Administrative: configure a credential query and its validator.
    pub fn set_credential_query(
        &mut self,
        query: CredentialQuery,
        validator: Box<dyn CredentialValidator>,
    ) {
        debug!("credential query {} configured", query.request_id);
        self.credential.set_query(query, validator);
    }

    /// Submit a credential proof response for `subject`. Not phase-gated;
    /// clearance obtained early simply waits for the registration window.
    pub fn submit_credential_response(
        &mut self,
        request_id: u64,
        subject: &Address,
        signals: &[Fr],
    ) -> Result<(), ElectionError> {
        self.credential.submit_response(request_id, subject, signals)?;
        debug!("credential cleared for {subject}");
        Ok(())
    }

    /// Register an anonymous commitment for `caller`.
    pub fn register_to_vote(
        &mut self,
        caller: &Address,
        commitment: Fr,
        now: u64,
    ) -> Result<u64, ElectionError> {
        let phase = self.schedule.phase_at(now);
        if phase != Phase::Registration {
            warn!("registration attempt by {caller} during {phase} phase");
            return Err(ElectionError::PhaseError(GatedAction::Registration));
        }
        if !self.credential.is_cleared(caller) {
            return Err(ElectionError::NotCleared);
        }
        if self.voters.contains_key(caller) {
            return Err(ElectionError::AlreadyRegistered);
        }
        if self.registered_count >= self.max_voters {
            return Err(ElectionError::ElectionFull);
        }

        let leaf_index = self.registry.insert(commitment)?;
        self.voters.insert(
            caller.clone(),
            VoterRecord {
                commitment,
                leaf_index,
            },
        );
        self.registered_count += 1;
        self.observe_phase(phase);
        self.events.emit(Event::Registered {
            commitment,
            leaf_index,
            timestamp: now,
        });
        info!("voter {caller} registered commitment {commitment} at leaf {leaf_index}");
        Ok(leaf_index)
    }

    /// Cast an anonymous ballot for `contestant_id`.
    ///
    /// Guard order follows cost and attribution: phase, contestant bounds,
    /// signal extraction, root recency, replay, then the pairing check. The
    /// nullifier is consumed in the same call that increments the tally.
    pub fn vote(
        &mut self,
        contestant_id: u32,
        proof: &BallotProof,
        public_signals: &[Fr],
        now: u64,
    ) -> Result<(), ElectionError> {
        let phase = self.schedule.phase_at(now);
        if phase != Phase::Voting {
            warn!("vote attempt during {phase} phase");
            return Err(ElectionError::PhaseError(GatedAction::Voting));
        }
        let count = self.contestants.len() as u32;
        if contestant_id >= count {
            return Err(ElectionError::InvalidContestant {
                index: contestant_id,
                count,
            });
        }
        let signals = PublicSignals::parse(public_signals)?;
        if !self.registry.is_known_root(&signals.claimed_root()) {
            return Err(ElectionError::UnknownRoot);
        }
        let nullifier = signals.nullifier();
        if self.nullifiers.contains(&nullifier) {
            return Err(ElectionError::AlreadyVoted);
        }
        self.ballot_gate.verify(proof, public_signals)?;

        self.nullifiers.insert(nullifier);
        self.contestants[contestant_id as usize].vote_count += 1;
        self.observe_phase(phase);
        self.events.emit(Event::Voted { contestant_id });
        info!(
            "ballot accepted for contestant {contestant_id} ({} votes)",
            self.contestants[contestant_id as usize].vote_count
        );
        Ok(())
    }

    fn observe_phase(&mut self, phase: Phase) {
        if phase != self.last_observed_phase {
            self.last_observed_phase = phase;
            self.events.emit(Event::ElectionStateChanged { new_phase: phase });
        }
    }

    // ------------------------------------------------------------------
    // Queries (never mutate)
    // ------------------------------------------------------------------

    pub fn summary(&self, now: u64) -> ElectionSummary {
        ElectionSummary {
            title: self.title.clone(),
            phase: self.schedule.phase_at(now),
            schedule: self.schedule,
            max_voters: self.max_voters,
            registered_voters_count: self.registered_count,
            contestant_count: self.contestants.len() as u32,
        }
    }

    pub fn phase(&self, now: u64) -> Phase {
        self.schedule.phase_at(now)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn schedule(&self) -> &ElectionSchedule {
        &self.schedule
    }

    pub fn max_voters(&self) -> u64 {
        self.max_voters
    }

    pub fn contestant_count(&self) -> u32 {
        self.contestants.len() as u32
    }

    pub fn contestant(&self, index: u32) -> Result<&Contestant, ElectionError> {
        self.contestants
            .get(index as usize)
            .ok_or(ElectionError::InvalidContestant {
                index,
                count: self.contestants.len() as u32,
            })
    }

    pub fn registered_voters_count(&self) -> u64 {
        self.registered_count
    }

    pub fn is_registered(&self, subject: &Address) -> bool {
        self.voters.contains_key(subject)
    }

    /// Registration audit record, if `subject` has registered.
    pub fn voter_record(&self, subject: &Address) -> Option<&VoterRecord> {
        self.voters.get(subject)
    }

    pub fn has_kyc(&self, subject: &Address) -> bool {
        self.credential.is_cleared(subject)
    }

    pub fn credential_query(&self, request_id: u64) -> Option<&CredentialQuery> {
        self.credential.query(request_id)
    }

    /// Index the next registration will occupy.
    pub fn next_leaf_index(&self) -> u64 {
        self.registry.next_leaf_index()
    }

    pub fn current_root(&self) -> Fr {
        self.registry.current_root()
    }

    pub fn is_known_root(&self, root: &Fr) -> bool {
        self.registry.is_known_root(root)
    }

    /// Pending events, without consuming them.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Consume and return every pending event.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }
}
