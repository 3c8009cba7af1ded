//! Causal event registry.
//!
//! A registry binds one agent identifier for its lifetime, owns the
//! commitment log, and enforces predecessor linkage: an event may only name
//! a predecessor that is already in this registry. Writes must be serialized
//! by the caller; every read is pure.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::causal::event::{event_digest, CausalEvent, EventInput};
use crate::causal::merkle::{CommitmentLog, MerkleError};
use crate::crypto::CryptoError;
use crate::ident;
use crate::types::{Digest, ProofStep};

/// Registration failures. These are caller bugs, not proof verdicts.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("agent identifier must not be empty")]
    EmptyAgentId,

    #[error("agent ID mismatch: registry is bound to {bound}, event names {submitted}")]
    AgentMismatch { bound: String, submitted: String },

    #[error("unknown predecessor digest: {0}")]
    UnknownPredecessor(Digest),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Ordered event store for a single agent, backed by a [`CommitmentLog`].
#[derive(Debug, Default)]
pub struct CausalRegistry {
    agent_id: String,
    log: CommitmentLog,
    events: Vec<CausalEvent>,
    by_id: HashMap<String, usize>,
    by_hash: HashMap<Digest, usize>,
    last_event_hash: Option<Digest>,
}

impl CausalRegistry {
    /// Create a registry bound to an agent identifier.
    pub fn new(agent_id: impl Into<String>) -> Result<Self, RegistryError> {
        let agent_id = agent_id.into();
        if agent_id.is_empty() {
            return Err(RegistryError::EmptyAgentId);
        }
        Ok(Self {
            agent_id,
            ..Self::default()
        })
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    /// Register an event: validate, digest, append, index.
    ///
    /// A missing predecessor is accepted even after the first event; it marks
    /// an intentional branch in the causal graph and is not repaired.
    pub fn register_event(&mut self, input: EventInput) -> Result<CausalEvent, RegistryError> {
        // 1. The registry is bound to exactly one agent.
        if input.agent_id != self.agent_id {
            return Err(RegistryError::AgentMismatch {
                bound: self.agent_id.clone(),
                submitted: input.agent_id,
            });
        }

        // 2. A named predecessor must already be registered here.
        if let Some(predecessor) = &input.predecessor_hash {
            if !self.by_hash.contains_key(predecessor) {
                return Err(RegistryError::UnknownPredecessor(predecessor.clone()));
            }
        }

        // 3. The action type is a closed enum; out-of-set values cannot
        //    reach this point and surface at the parse boundary instead.

        // 4. Identity and canonical digest.
        let causal_event_id = ident::generate()?;
        let event_hash = event_digest(
            &input.agent_id,
            input.action_type,
            &input.payload_hash,
            input.predecessor_hash.as_ref(),
            input.timestamp,
        );

        // 5.-6. Position snapshot, then append for the post-insertion root.
        let position_in_tree = self.log.leaf_count();
        let tree_root_hash = self.log.append(event_hash.clone());

        let event = CausalEvent {
            causal_event_id,
            agent_id: input.agent_id,
            action_type: input.action_type,
            payload_hash: input.payload_hash,
            predecessor_hash: input.predecessor_hash,
            timestamp: input.timestamp,
            event_hash,
            position_in_tree,
            tree_root_hash,
        };

        // 7. Indices and the last-digest pointer.
        let slot = self.events.len();
        self.by_id.insert(event.causal_event_id.clone(), slot);
        self.by_hash.insert(event.event_hash.clone(), slot);
        self.last_event_hash = Some(event.event_hash.clone());
        self.events.push(event.clone());

        debug!(
            agent = %self.agent_id,
            id = %event.causal_event_id,
            position = position_in_tree,
            "registered causal event"
        );
        Ok(event)
    }

    pub fn event_by_id(&self, causal_event_id: &str) -> Option<&CausalEvent> {
        self.by_id
            .get(causal_event_id)
            .map(|slot| &self.events[*slot])
    }

    pub fn event_by_hash(&self, event_hash: &Digest) -> Option<&CausalEvent> {
        self.by_hash.get(event_hash).map(|slot| &self.events[*slot])
    }

    /// Current log root; the empty sentinel before any event.
    pub fn root_hash(&self) -> Digest {
        self.log.root()
    }

    /// Digest of the most recently registered event.
    pub fn last_event_hash(&self) -> Option<&Digest> {
        self.last_event_hash.as_ref()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    /// Events in registration order.
    pub fn events(&self) -> &[CausalEvent] {
        &self.events
    }

    /// Inclusion path for the leaf at `position`.
    pub fn proof_path(&self, position: usize) -> Result<Vec<ProofStep>, MerkleError> {
        self.log.proof_path(position)
    }

    /// Check a registered event digest against the current root.
    pub fn verify_event_inclusion(&self, event_hash: &Digest) -> bool {
        let Some(event) = self.event_by_hash(event_hash) else {
            return false;
        };
        let Ok(path) = self.log.proof_path(event.position_in_tree) else {
            return false;
        };
        CommitmentLog::verify_inclusion(event_hash, &path, &self.log.root())
    }

    /// Walk predecessor pointers backwards from a target, oldest first.
    ///
    /// The result holds at most `max_depth` events and always ends with the
    /// target. An unknown identifier yields an empty list; a broken pointer
    /// mid-walk ends the walk with whatever was gathered.
    pub fn causal_chain(&self, target_id: &str, max_depth: usize) -> Vec<CausalEvent> {
        let Some(target) = self.event_by_id(target_id) else {
            return Vec::new();
        };

        let mut chain: VecDeque<CausalEvent> = VecDeque::new();
        let mut cursor = target.predecessor_hash.clone();
        let mut remaining = max_depth.saturating_sub(1);
        while remaining > 0 {
            let Some(previous) = cursor.as_ref().and_then(|hash| self.event_by_hash(hash)) else {
                break;
            };
            chain.push_front(previous.clone());
            cursor = previous.predecessor_hash.clone();
            remaining -= 1;
        }
        chain.push_back(target.clone());
        chain.into()
    }

    /// Debugging snapshot of the full registry state. Not a durability format.
    pub fn export(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            agent_id: self.agent_id.clone(),
            events: self.events.clone(),
            tree: TreeSnapshot {
                leaves: self.log.leaves().to_vec(),
                levels: self.log.levels().to_vec(),
                root_hash: self.log.root(),
                leaf_count: self.log.leaf_count(),
            },
        }
    }
}

/// Export view of a registry.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub agent_id: String,
    pub events: Vec<CausalEvent>,
    pub tree: TreeSnapshot,
}

/// Export view of the commitment log.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeSnapshot {
    pub leaves: Vec<Digest>,
    pub levels: Vec<Vec<Digest>>,
    pub root_hash: Digest,
    pub leaf_count: usize,
}
