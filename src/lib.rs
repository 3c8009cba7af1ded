//! # causal-proof
//!
//! Causal behavioral verification for agents: cryptographic evidence that a
//! named agent produced a sequence of actions in a specific order, compact
//! enough to ride along in request/response headers and verifiable without
//! any centralized validator.
//!
//! The crate is built around five pieces:
//!
//! - An append-only **Merkle commitment log** with incremental roots and
//!   inclusion proofs ([`causal::CommitmentLog`])
//! - A **causal registry** binding events to one agent and to their
//!   predecessors ([`causal::CausalRegistry`])
//! - A **proof generator** bundling inclusion path, causal chain, and an
//!   ECDSA signature over the current root ([`proof::generate_proof`])
//! - A **stateless verifier** and declarative **chain rules**
//!   ([`verifier::verify_proof`], [`policy::ChainPolicy`])
//! - A **progressive pipeline** that answers immediately from proof metadata
//!   and defers the cryptographic check ([`progressive::assess`])
//!
//! ## Quick start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use causal_proof::causal::{ActionType, CausalRegistry, EventInput};
//! use causal_proof::{crypto, generate_proof, verify_proof};
//!
//! let mut registry = CausalRegistry::new("agent-7")?;
//! let request = registry.register_event(EventInput {
//!     agent_id: "agent-7".into(),
//!     action_type: ActionType::Request,
//!     payload_hash: crypto::sha3(b"GET /quote"),
//!     predecessor_hash: None,
//!     timestamp: 1_700_000_000_000,
//! })?;
//!
//! let private_key = crypto::generate_private_key()?;
//! let public_key = crypto::public_key(&private_key)?;
//!
//! let proof = generate_proof(&registry, &request.causal_event_id, &private_key, None)?;
//! let report = verify_proof(&proof, "agent-7", &public_key);
//! assert!(report.is_valid);
//! # Ok(())
//! # }
//! ```
//!
//! ## Security notes
//!
//! - Only payload digests enter the log; plaintext payloads never do.
//! - Proof signatures cover the registry's **current** root, attesting that
//!   the log rooted there contains the target event.
//! - Signatures are canonical low-s ECDSA; high-s twins are rejected.

pub mod causal;
pub mod codec;
pub mod crypto;
pub mod error;
pub mod ident;
pub mod policy;
pub mod progressive;
pub mod proof;
pub mod types;
pub mod verifier;

pub use causal::{ActionType, CausalEvent, CausalRegistry, EventInput, RegistryError};
pub use error::ProofError;
pub use policy::{ChainPolicy, PolicyOutcome};
pub use progressive::{
    assess, verify_light, DeferredStatus, LightCheckOptions, ProgressiveDecision,
    ProgressiveOptions, ProofBundle, RefusalReason, VerifyContext,
};
pub use proof::{generate_proof, generate_proof_batch, DEFAULT_CHAIN_DEPTH};
pub use types::{
    CausalProof, ChainLink, Digest, LightLink, LightProof, ProofStep, SiblingPosition,
};
pub use verifier::{verify_proof, VerificationReport};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Current Unix time in milliseconds.
pub(crate) fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
