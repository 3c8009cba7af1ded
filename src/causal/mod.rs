//! Causal event log: events, the append-only commitment, and the registry
//! that binds them to a single agent.

pub mod event;
pub mod merkle;
pub mod registry;

pub use event::{event_digest, ActionType, CausalEvent, EventInput, InvalidActionType};
pub use merkle::{CommitmentLog, MerkleError};
pub use registry::{CausalRegistry, RegistryError, RegistrySnapshot, TreeSnapshot};
