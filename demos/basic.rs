//! End-to-end walkthrough: register a request/response pair, prove the
//! response, ship the proof through the transport headers, and verify it on
//! the consumer side.
//!
//! Run with: cargo run --example basic

use causal_proof::causal::{ActionType, CausalRegistry, EventInput};
use causal_proof::crypto::{self, sha3};
use causal_proof::{
    assess, codec, generate_proof, verify_proof, ChainPolicy, LightProof, ProgressiveOptions,
    ProofBundle, VerifyContext,
};

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== causal-proof: agent behavior verification demo ===");
    println!();

    // Step 1: the agent keeps a registry for its session.
    let agent_id = "agent-7";
    let mut registry = CausalRegistry::new(agent_id)?;
    println!("[1] Registry bound to {agent_id}");

    // Step 2: log a request and the response it caused.
    let request = registry.register_event(EventInput {
        agent_id: agent_id.into(),
        action_type: ActionType::Request,
        payload_hash: sha3(b"GET /quote?pair=BTC-USD"),
        predecessor_hash: None,
        timestamp: now_ms() - 250,
    })?;
    let response = registry.register_event(EventInput {
        agent_id: agent_id.into(),
        action_type: ActionType::Response,
        payload_hash: sha3(b"200 OK quote=64231.50"),
        predecessor_hash: Some(request.event_hash.clone()),
        timestamp: now_ms(),
    })?;
    println!(
        "[2] Logged {} events, root {}...",
        registry.event_count(),
        &registry.root_hash().as_str()[..12]
    );

    // Step 3: prove the response and sign the current root.
    let private_key = crypto::generate_private_key()?;
    let public_key = crypto::public_key(&private_key)?;
    let proof = generate_proof(&registry, &response.causal_event_id, &private_key, None)?;
    println!(
        "[3] Proof built: chain depth {}, path length {}",
        proof.causal_chain.len(),
        proof.proof_path.len()
    );

    // Step 4: attach to a request as headers, then decode on the other side.
    let headers = codec::headers(&proof)?;
    println!(
        "[4] {}: {} bytes, {}: {}",
        headers[0].0,
        headers[0].1.len(),
        headers[1].0,
        headers[1].1
    );
    let received = codec::decode(&headers[0].1)?;

    // Step 5: full stateless verification.
    let report = verify_proof(&received, agent_id, &public_key);
    println!(
        "[5] Verified: valid={}, actions={}, trust={:.2}",
        report.is_valid, report.verified_actions, report.trust_score
    );

    // Step 6: semantic rules over the authenticated chain.
    let policy = ChainPolicy {
        request_must_precede_response: true,
        require_direct_causality: true,
        min_verification_depth: Some(2),
        ..ChainPolicy::default()
    };
    let outcome = policy.validate(&received.causal_chain);
    println!("[6] Policy check: valid={}", outcome.valid);

    // Step 7: progressive admission for latency-sensitive consumers.
    let light = LightProof::from_proof(&received, now_ms());
    let decision = assess(
        ProofBundle {
            light,
            full: Some(received),
        },
        &VerifyContext {
            agent_id: agent_id.into(),
            public_key: Some(public_key),
        },
        &ProgressiveOptions {
            min_depth: 2,
            ..ProgressiveOptions::default()
        },
    );
    println!(
        "[7] Progressive: proceed={}, immediate trust={:.1}, deferred={:?}",
        decision.can_proceed, decision.immediate_trust, decision.deferred_status
    );
    if let Some(handle) = decision.deferred {
        let deferred_report = handle.await?;
        println!(
            "    Deferred full check landed: valid={}, trust={:.2}",
            deferred_report.is_valid, deferred_report.trust_score
        );
    }

    Ok(())
}
