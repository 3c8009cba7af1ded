//! Proof generation.
//!
//! A proof bundles the target event, its inclusion path, the causal chain
//! that reached it, and an ECDSA signature over the registry's current root.

use crate::causal::registry::CausalRegistry;
use crate::crypto;
use crate::error::ProofError;
use crate::types::{CausalProof, ChainLink};

/// Chain depth used when the caller does not pick one. Matches the point at
/// which the verifier's trust score stops rewarding longer chains.
pub const DEFAULT_CHAIN_DEPTH: usize = 10;

/// Generate a proof for a registered event.
///
/// The signature covers the registry's root at generation time, not the root
/// stored in the target event. A proof built from a later registry state
/// therefore still verifies: it attests that the agent whose log presently
/// has this root produced the target event and the chain that reached it.
pub fn generate_proof(
    registry: &CausalRegistry,
    target_id: &str,
    private_key_hex: &str,
    chain_depth: Option<usize>,
) -> Result<CausalProof, ProofError> {
    let target = registry
        .event_by_id(target_id)
        .ok_or_else(|| ProofError::UnknownEvent(target_id.to_owned()))?;

    let proof_path = registry.proof_path(target.position_in_tree)?;
    let depth = chain_depth.unwrap_or(DEFAULT_CHAIN_DEPTH);
    let causal_chain: Vec<ChainLink> = registry
        .causal_chain(target_id, depth)
        .iter()
        .map(ChainLink::from)
        .collect();

    let tree_root_hash = registry.root_hash();
    let agent_signature = crypto::sign(tree_root_hash.as_str(), private_key_hex)?;

    Ok(CausalProof {
        target_event: target.clone(),
        proof_path,
        causal_chain,
        tree_root_hash,
        agent_signature,
    })
}

/// Generate proofs for several targets against the same registry state.
///
/// Fails on the first target that cannot be proven.
pub fn generate_proof_batch<I, S>(
    registry: &CausalRegistry,
    target_ids: I,
    private_key_hex: &str,
    chain_depth: Option<usize>,
) -> Result<Vec<CausalProof>, ProofError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    target_ids
        .into_iter()
        .map(|id| generate_proof(registry, id.as_ref(), private_key_hex, chain_depth))
        .collect()
}
