//! Append-only incremental Merkle commitment registry.
//!
//! Fixed depth, capacity `2^depth` leaves. Insertion recomputes the ancestor
//! chain in O(depth) using the classic filled-subtrees frontier and a
//! precomputed zero-subtree cache. Every root that has ever been current is
//! retained (optionally behind a FIFO cap) so a proof built against a
//! slightly stale tree state is still accepted.

use std::collections::{HashSet, VecDeque};

use crate::error::{ConfigError, ElectionError};
use crate::field::{hash_pair, Fr};

/// Largest supported tree depth.
pub const MAX_DEPTH: u32 = 32;

pub struct CommitmentRegistry {
    depth: u32,
    next_index: u64,
    /// Per-level left sibling of the insertion frontier.
    filled: Vec<Fr>,
    /// `zeros[l]` is the root of an empty subtree of height `l`.
    zeros: Vec<Fr>,
    current_root: Fr,
    known: HashSet<Fr>,
    /// Roots in publication order, for FIFO eviction.
    history: VecDeque<Fr>,
    root_cap: Option<usize>,
}

impl CommitmentRegistry {
    /// Registry with unbounded root retention.
    pub fn new(depth: u32) -> Result<Self, ConfigError> {
        Self::with_retention(depth, None)
    }

    /// Registry that retains only the `cap` most recent roots.
    pub fn with_root_capacity(depth: u32, cap: usize) -> Result<Self, ConfigError> {
        Self::with_retention(depth, Some(cap.max(1)))
    }

    fn with_retention(depth: u32, root_cap: Option<usize>) -> Result<Self, ConfigError> {
        if depth == 0 || depth > MAX_DEPTH {
            return Err(ConfigError::DepthOutOfRange(depth));
        }
        let mut zeros = Vec::with_capacity(depth as usize + 1);
        zeros.push(Fr::ZERO);
        for level in 0..depth as usize {
            let z = zeros[level];
            zeros.push(hash_pair(&z, &z));
        }
        let empty_root = zeros[depth as usize];
        let mut known = HashSet::new();
        known.insert(empty_root);
        Ok(CommitmentRegistry {
            depth,
            next_index: 0,
            filled: zeros[..depth as usize].to_vec(),
            zeros,
            current_root: empty_root,
            known,
            history: VecDeque::from([empty_root]),
            root_cap,
        })
    }

    /// Place `leaf` at the next free index and publish the new root.
    pub fn insert(&mut self, leaf: Fr) -> Result<u64, ElectionError> {
        if self.next_index >= self.capacity() {
            return Err(ElectionError::RegistryFull);
        }
        let index = self.next_index;
        let mut node = leaf;
        let mut position = index;
        for level in 0..self.depth as usize {
            if position & 1 == 0 {
                self.filled[level] = node;
                node = hash_pair(&node, &self.zeros[level]);
            } else {
                node = hash_pair(&self.filled[level], &node);
            }
            position >>= 1;
        }
        self.next_index += 1;
        self.current_root = node;
        self.publish_root(node);
        Ok(index)
    }

    fn publish_root(&mut self, root: Fr) {
        if self.known.insert(root) {
            self.history.push_back(root);
        }
        if let Some(cap) = self.root_cap {
            while self.history.len() > cap {
                match self.history.pop_front() {
                    // The current root is never evicted.
                    Some(old) if old == self.current_root => {
                        self.history.push_back(old);
                        break;
                    }
                    Some(old) => {
                        self.known.remove(&old);
                    }
                    None => break,
                }
            }
        }
    }

    /// Membership test against the retained root history.
    pub fn is_known_root(&self, root: &Fr) -> bool {
        self.known.contains(root)
    }

    pub fn current_root(&self) -> Fr {
        self.current_root
    }

    /// Index the next insertion will occupy; also the number of leaves stored.
    pub fn next_leaf_index(&self) -> u64 {
        self.next_index
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn capacity(&self) -> u64 {
        1u64 << self.depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_out_of_range_depth() {
        assert_eq!(
            CommitmentRegistry::new(0).err(),
            Some(ConfigError::DepthOutOfRange(0))
        );
        assert_eq!(
            CommitmentRegistry::new(MAX_DEPTH + 1).err(),
            Some(ConfigError::DepthOutOfRange(MAX_DEPTH + 1))
        );
        assert!(CommitmentRegistry::new(MAX_DEPTH).is_ok());
    }

    #[test]
    fn empty_root_is_known_from_the_start() {
        let registry = CommitmentRegistry::new(3).unwrap();
        assert!(registry.is_known_root(&registry.current_root()));
        assert_eq!(registry.next_leaf_index(), 0);
        assert_eq!(registry.capacity(), 8);
    }

    #[test]
    fn insert_assigns_sequential_indices_and_new_roots() {
        let mut registry = CommitmentRegistry::new(3).unwrap();
        let mut last_root = registry.current_root();
        for i in 0..8u64 {
            let index = registry.insert(Fr::from_u64(i + 100)).unwrap();
            assert_eq!(index, i);
            assert_ne!(registry.current_root(), last_root);
            last_root = registry.current_root();
        }
        assert_eq!(
            registry.insert(Fr::from_u64(999)),
            Err(ElectionError::RegistryFull)
        );
        assert_eq!(registry.next_leaf_index(), 8);
    }

    #[test]
    fn roots_remain_known_after_later_insertions() {
        let mut registry = CommitmentRegistry::new(4).unwrap();
        let mut roots = vec![registry.current_root()];
        for i in 0..10u64 {
            registry.insert(Fr::from_u64(i + 1)).unwrap();
            roots.push(registry.current_root());
        }
        for root in &roots {
            assert!(registry.is_known_root(root));
        }
        assert!(!registry.is_known_root(&Fr::from_u64(42)));
    }

    #[test]
    fn identical_leaf_sequences_produce_identical_roots() {
        let mut a = CommitmentRegistry::new(5).unwrap();
        let mut b = CommitmentRegistry::new(5).unwrap();
        for i in 0..7u64 {
            a.insert(Fr::from_u64(i)).unwrap();
            b.insert(Fr::from_u64(i)).unwrap();
        }
        assert_eq!(a.current_root(), b.current_root());
    }

    #[test]
    fn bounded_history_evicts_fifo_but_never_the_current_root() {
        let mut registry = CommitmentRegistry::with_root_capacity(3, 2).unwrap();
        let empty = registry.current_root();

        registry.insert(Fr::from_u64(1)).unwrap();
        let r1 = registry.current_root();
        assert!(registry.is_known_root(&empty));

        registry.insert(Fr::from_u64(2)).unwrap();
        let r2 = registry.current_root();
        assert!(!registry.is_known_root(&empty));
        assert!(registry.is_known_root(&r1));
        assert!(registry.is_known_root(&r2));

        registry.insert(Fr::from_u64(3)).unwrap();
        assert!(!registry.is_known_root(&r1));
        assert!(registry.is_known_root(&r2));
        assert!(registry.is_known_root(&registry.current_root()));
    }

    proptest! {
        #[test]
        fn indices_are_monotone_and_every_root_is_retained(
            leaves in proptest::collection::vec(1u64..u64::MAX, 1..64)
        ) {
            let mut registry = CommitmentRegistry::new(8).unwrap();
            let mut roots = vec![registry.current_root()];
            for (i, leaf) in leaves.iter().enumerate() {
                let index = registry.insert(Fr::from_u64(*leaf)).unwrap();
                prop_assert_eq!(index, i as u64);
                roots.push(registry.current_root());
            }
            for root in &roots {
                prop_assert!(registry.is_known_root(root));
            }
            prop_assert_eq!(registry.next_leaf_index(), leaves.len() as u64);
        }
    }
}
