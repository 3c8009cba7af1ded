//! Append-only Merkle commitment log.
//!
//! Leaves are event digests in insertion order; every append updates the
//! root in O(log n) by walking one path upward. Pair hashing is sorted, so a
//! verifier folds `pair(sibling, current)` without caring which side the
//! sibling was on; the path still records the side so independently built
//! paths compare equal.

use thiserror::Error;

use crate::crypto::hash::sorted_pair;
use crate::types::{Digest, ProofStep, SiblingPosition};

/// Commitment log failures. Append never fails; only path queries can.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MerkleError {
    #[error("leaf index {index} out of range for {leaf_count} leaves")]
    LeafIndexOutOfRange { index: usize, leaf_count: usize },
}

/// Append-only log of 32-byte leaf digests with an incrementally maintained
/// node pyramid. Nodes live at `(level, index)`: level 0 holds the leaves,
/// each higher level the folded parents.
#[derive(Clone, Debug, Default)]
pub struct CommitmentLog {
    levels: Vec<Vec<Digest>>,
}

impl CommitmentLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leaf_count(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// Number of populated levels, leaves included.
    pub fn height(&self) -> usize {
        self.levels.len()
    }

    /// Leaves in insertion order.
    pub fn leaves(&self) -> &[Digest] {
        self.levels.first().map_or(&[], Vec::as_slice)
    }

    /// All node levels, leaves first. Exposed for registry export only.
    pub fn levels(&self) -> &[Vec<Digest>] {
        &self.levels
    }

    /// Current root: the empty sentinel with no leaves, the leaf digest with
    /// one, otherwise the single node at the topmost level.
    pub fn root(&self) -> Digest {
        match self.levels.last().and_then(|row| row.first()) {
            Some(top) => top.clone(),
            None => Digest::empty(),
        }
    }

    /// Append a leaf and fold the affected path upward. Returns the new root.
    ///
    /// A node without a right sibling is promoted verbatim to the next level
    /// and re-folded later, once the sibling arrives.
    pub fn append(&mut self, leaf: Digest) -> Digest {
        if self.levels.is_empty() {
            self.levels.push(Vec::new());
        }
        let mut index = self.levels[0].len();
        self.levels[0].push(leaf.clone());

        let mut current = leaf;
        let mut level = 0;
        while self.levels[level].len() > 1 {
            let parent = index / 2;
            if index % 2 == 1 {
                let sibling = self.levels[level][index - 1].clone();
                current = sorted_pair(&sibling, &current);
            }
            if self.levels.len() == level + 1 {
                self.levels.push(Vec::new());
            }
            let row = &mut self.levels[level + 1];
            if parent == row.len() {
                row.push(current.clone());
            } else {
                row[parent] = current.clone();
            }
            index = parent;
            level += 1;
        }
        self.root()
    }

    /// Inclusion path for the leaf at `index`: one step per level below the
    /// root. Promotion levels carry the self-pair sentinel.
    pub fn proof_path(&self, index: usize) -> Result<Vec<ProofStep>, MerkleError> {
        let leaf_count = self.leaf_count();
        if index >= leaf_count {
            return Err(MerkleError::LeafIndexOutOfRange { index, leaf_count });
        }

        let mut path = Vec::with_capacity(self.levels.len().saturating_sub(1));
        let mut node_index = index;
        for level in 0..self.levels.len().saturating_sub(1) {
            let row = &self.levels[level];
            let node = row[node_index].clone();
            let (sibling, position) = if node_index % 2 == 0 {
                match row.get(node_index + 1) {
                    Some(right) => (right.clone(), SiblingPosition::Right),
                    None => (node.clone(), SiblingPosition::Right),
                }
            } else {
                (row[node_index - 1].clone(), SiblingPosition::Left)
            };
            path.push(ProofStep {
                event_hash: node,
                sibling_hash: sibling,
                position,
            });
            node_index /= 2;
        }
        Ok(path)
    }

    /// Fold a path from a leaf digest and compare against an expected root.
    ///
    /// The empty-root sentinel rejects every proof; an empty path accepts
    /// exactly when the leaf is itself the root (single-leaf log).
    pub fn verify_inclusion(leaf: &Digest, path: &[ProofStep], expected_root: &Digest) -> bool {
        if expected_root.is_empty() {
            return false;
        }
        let mut current = leaf.clone();
        for step in path {
            if step.is_self_pair() {
                continue;
            }
            current = sorted_pair(&step.sibling_hash, &current);
        }
        current == *expected_root
    }
}
