//! Credential verification gate ("KYC").
//!
//! The gate owns the configured credential queries and the per-address
//! cleared set. It performs no cryptography itself: each query carries an
//! injected validator capability that returns a strict verdict over the
//! submitted public signals. A positive verdict clears the subject, once and
//! idempotently; the gate is the sole writer of the cleared set.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::election::Address;
use crate::error::ElectionError;
use crate::field::{hash_many, Fr};

/// Comparison values are padded to this many slots before sponge hashing,
/// matching the circuit's fixed-width value array.
pub const QUERY_VALUE_SLOTS: usize = 64;

/// Credential atomic query operator codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// No operation; the circuit skips query verification.
    Noop,
    Eq,
    Lt,
    Gt,
    In,
    Nin,
    Ne,
}

impl Operator {
    pub fn code(self) -> u64 {
        match self {
            Operator::Noop => 0,
            Operator::Eq => 1,
            Operator::Lt => 2,
            Operator::Gt => 3,
            Operator::In => 4,
            Operator::Nin => 5,
            Operator::Ne => 6,
        }
    }
}

/// The predicate a credential must satisfy, in the form the validator hashes.
///
/// An off-chain client must reproduce [`QueryDescriptor::query_hash`] exactly;
/// a mismatch makes the validator reject an otherwise-valid proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryDescriptor {
    /// Schema identifier (domain hash).
    pub schema: Fr,
    pub slot_index: u64,
    pub operator: Operator,
    pub claim_path_key: Fr,
    pub claim_path_not_exists: bool,
    /// Comparison values; for unary operators only the first matters.
    pub values: Vec<Fr>,
}

impl QueryDescriptor {
    /// Single fixed-arity hash over the query components, with the value
    /// array sponge-hashed at its padded width first.
    pub fn query_hash(&self) -> Fr {
        let mut padded = self.values.clone();
        padded.truncate(QUERY_VALUE_SLOTS);
        padded.resize(QUERY_VALUE_SLOTS, Fr::ZERO);
        let value_hash = hash_many(b"zk-election.query.values.v1", &padded);
        hash_many(
            b"zk-election.query.v1",
            &[
                self.schema,
                Fr::from_u64(self.slot_index),
                Fr::from_u64(self.operator.code()),
                self.claim_path_key,
                Fr::from_u64(self.claim_path_not_exists as u64),
                value_hash,
            ],
        )
    }
}

/// A configured credential query, referenced by request id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialQuery {
    pub request_id: u64,
    /// Opaque to the gate; matched by the validator.
    pub query_hash: Fr,
    /// Invoke-request blob handed to wallets; not interpreted by the core.
    pub metadata: serde_json::Value,
}

/// External credential validator, injected per configured query.
pub trait CredentialValidator {
    fn validate(&self, query: &CredentialQuery, subject: &Address, signals: &[Fr]) -> bool;
}

pub struct CredentialGate {
    queries: HashMap<u64, (CredentialQuery, Box<dyn CredentialValidator>)>,
    cleared: HashSet<Address>,
}

impl CredentialGate {
    pub fn new() -> Self {
        CredentialGate {
            queries: HashMap::new(),
            cleared: HashSet::new(),
        }
    }

    /// Configure (or replace) the query under its request id.
    pub fn set_query(&mut self, query: CredentialQuery, validator: Box<dyn CredentialValidator>) {
        self.queries.insert(query.request_id, (query, validator));
    }

    /// Submit a credential proof response for `subject`.
    ///
    /// Re-submission after clearance is harmless. On any failure the cleared
    /// set is unchanged.
    pub fn submit_response(
        &mut self,
        request_id: u64,
        subject: &Address,
        signals: &[Fr],
    ) -> Result<(), ElectionError> {
        let (query, validator) = self
            .queries
            .get(&request_id)
            .ok_or(ElectionError::UnknownQuery(request_id))?;
        if !validator.validate(query, subject, signals) {
            return Err(ElectionError::CredentialRejected);
        }
        self.cleared.insert(subject.clone());
        Ok(())
    }

    pub fn is_cleared(&self, subject: &Address) -> bool {
        self.cleared.contains(subject)
    }

    pub fn query(&self, request_id: u64) -> Option<&CredentialQuery> {
        self.queries.get(&request_id).map(|(query, _)| query)
    }
}

impl Default for CredentialGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> QueryDescriptor {
        QueryDescriptor {
            schema: Fr::from_u64(65_533),
            slot_index: 0,
            operator: Operator::Lt,
            claim_path_key: Fr::from_u64(2_095),
            claim_path_not_exists: false,
            values: vec![Fr::from_u64(20_060_904)],
        }
    }

    #[test]
    fn operator_codes_are_stable() {
        assert_eq!(Operator::Noop.code(), 0);
        assert_eq!(Operator::Eq.code(), 1);
        assert_eq!(Operator::Lt.code(), 2);
        assert_eq!(Operator::Gt.code(), 3);
        assert_eq!(Operator::In.code(), 4);
        assert_eq!(Operator::Nin.code(), 5);
        assert_eq!(Operator::Ne.code(), 6);
    }

    #[test]
    fn query_hash_is_deterministic_and_input_sensitive() {
        let base = descriptor();
        assert_eq!(base.query_hash(), descriptor().query_hash());

        let mut other = descriptor();
        other.operator = Operator::Gt;
        assert_ne!(base.query_hash(), other.query_hash());

        let mut other = descriptor();
        other.values = vec![Fr::from_u64(20_060_905)];
        assert_ne!(base.query_hash(), other.query_hash());
    }

    #[test]
    fn short_value_arrays_hash_like_their_padded_form() {
        let explicit = QueryDescriptor {
            values: {
                let mut v = vec![Fr::from_u64(20_060_904)];
                v.resize(QUERY_VALUE_SLOTS, Fr::ZERO);
                v
            },
            ..descriptor()
        };
        assert_eq!(descriptor().query_hash(), explicit.query_hash());
    }
}
