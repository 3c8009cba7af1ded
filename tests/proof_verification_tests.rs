//! Full proof generation and stateless verification, including the tampering
//! and mismatch paths a hostile relay could exercise.

use causal_proof::causal::{ActionType, CausalRegistry, EventInput};
use causal_proof::crypto::{self, sha3};
use causal_proof::{codec, generate_proof, generate_proof_batch, verify_proof, ChainPolicy};

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}

/// A registry with a request -> response pair at fresh timestamps, plus the
/// response id and a key pair.
fn request_response_fixture() -> (CausalRegistry, String, String, String) {
    let mut registry = CausalRegistry::new("0xA").unwrap();
    let now = now_ms();

    let request = registry
        .register_event(EventInput {
            agent_id: "0xA".into(),
            action_type: ActionType::Request,
            payload_hash: sha3(b"GET /quote"),
            predecessor_hash: None,
            timestamp: now - 500,
        })
        .unwrap();
    let response = registry
        .register_event(EventInput {
            agent_id: "0xA".into(),
            action_type: ActionType::Response,
            payload_hash: sha3(b"200 OK"),
            predecessor_hash: Some(request.event_hash),
            timestamp: now,
        })
        .unwrap();

    let private_key = crypto::generate_private_key().unwrap();
    let public_key = crypto::public_key(&private_key).unwrap();
    (registry, response.causal_event_id, private_key, public_key)
}

#[test]
fn test_request_response_happy_path() {
    let (registry, response_id, private_key, public_key) = request_response_fixture();
    let proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();

    let report = verify_proof(&proof, "0xA", &public_key);
    assert!(report.is_valid, "{:?}", report.errors);
    assert_eq!(report.verified_actions, 2);
    assert!(report.trust_score > 0.4);
}

#[test]
fn test_chain_links_are_ordered() {
    let (registry, response_id, private_key, _) = request_response_fixture();
    let proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();

    let chain = &proof.causal_chain;
    assert_eq!(
        chain.last().unwrap().event_hash,
        proof.target_event.event_hash
    );
    for k in 1..chain.len() {
        assert_eq!(
            chain[k].predecessor_hash.as_ref(),
            Some(&chain[k - 1].event_hash)
        );
    }
}

#[test]
fn test_tampered_merkle_sibling_detected() {
    let (registry, response_id, private_key, public_key) = request_response_fixture();
    let mut proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();

    proof.proof_path[0].sibling_hash = sha3(b"tampered");

    let report = verify_proof(&proof, "0xA", &public_key);
    assert!(!report.is_valid);
    assert!(report
        .errors
        .contains(&"Merkle inclusion proof verification failed".to_owned()));
    assert_eq!(report.trust_score, 0.0);
}

#[test]
fn test_wrong_agent_identifier_detected() {
    let (registry, response_id, private_key, public_key) = request_response_fixture();
    let proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();

    let report = verify_proof(&proof, "WrongAgent", &public_key);
    assert!(!report.is_valid);
    assert!(report
        .errors
        .contains(&"Agent ID mismatch: expected WrongAgent, got 0xA".to_owned()));
    // Every other check still holds, so the mismatch is the only error.
    assert_eq!(report.errors.len(), 1);
}

#[test]
fn test_wrong_public_key_detected() {
    let (registry, response_id, private_key, _) = request_response_fixture();
    let proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();

    let other_key = crypto::public_key(&crypto::generate_private_key().unwrap()).unwrap();
    let report = verify_proof(&proof, "0xA", &other_key);
    assert!(!report.is_valid);
    assert!(report
        .errors
        .iter()
        .any(|e| e.contains("signature verification failed")));
}

#[test]
fn test_rewritten_event_content_detected() {
    let (registry, response_id, private_key, public_key) = request_response_fixture();
    let mut proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();

    // Shift the claimed timestamp without recomputing the digest.
    proof.target_event.timestamp += 1;

    let report = verify_proof(&proof, "0xA", &public_key);
    assert!(!report.is_valid);
    assert!(report
        .errors
        .contains(&"Event hash does not match event content".to_owned()));
}

#[test]
fn test_reordered_chain_detected() {
    let (registry, response_id, private_key, public_key) = request_response_fixture();
    let mut proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();

    proof.causal_chain.swap(0, 1);

    let report = verify_proof(&proof, "0xA", &public_key);
    assert!(!report.is_valid);
    assert_eq!(report.verified_actions, 0);
}

#[test]
fn test_proof_survives_header_transport() {
    let (registry, response_id, private_key, public_key) = request_response_fixture();
    let proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();

    let header_value = codec::encode(&proof).unwrap();
    let decoded = codec::decode(&header_value).unwrap();
    assert_eq!(decoded, proof);

    let report = verify_proof(&decoded, "0xA", &public_key);
    assert!(report.is_valid, "{:?}", report.errors);
}

#[test]
fn test_proof_outlives_registry_growth() {
    let (mut registry, response_id, private_key, public_key) = request_response_fixture();
    // Proof generated after further appends signs the newer root and the
    // target's inclusion path reflects the grown tree.
    for i in 0..5i64 {
        registry
            .register_event(EventInput {
                agent_id: "0xA".into(),
                action_type: ActionType::StateTransition,
                payload_hash: sha3(format!("later-{i}").as_bytes()),
                predecessor_hash: None,
                timestamp: now_ms(),
            })
            .unwrap();
    }
    let proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();
    assert_ne!(proof.tree_root_hash, proof.target_event.tree_root_hash);

    let report = verify_proof(&proof, "0xA", &public_key);
    assert!(report.is_valid, "{:?}", report.errors);
}

#[test]
fn test_batch_proofs_verify_independently() {
    let (registry, _, private_key, public_key) = request_response_fixture();
    let ids: Vec<String> = registry
        .events()
        .iter()
        .map(|event| event.causal_event_id.clone())
        .collect();

    let proofs = generate_proof_batch(&registry, &ids, &private_key, None).unwrap();
    assert_eq!(proofs.len(), 2);
    for proof in &proofs {
        assert!(verify_proof(proof, "0xA", &public_key).is_valid);
    }
}

#[test]
fn test_policy_over_verified_chain() {
    let (registry, response_id, private_key, public_key) = request_response_fixture();
    let proof = generate_proof(&registry, &response_id, &private_key, None).unwrap();
    assert!(verify_proof(&proof, "0xA", &public_key).is_valid);

    let policy = ChainPolicy {
        request_must_precede_response: true,
        require_direct_causality: true,
        min_verification_depth: Some(2),
        max_time_gap_ms: Some(60_000),
        ..ChainPolicy::default()
    };
    let outcome = policy.validate(&proof.causal_chain);
    assert!(outcome.valid, "{:?}", outcome.violations);

    let strict = ChainPolicy {
        forbidden_action_types: vec![ActionType::Response],
        ..ChainPolicy::default()
    };
    assert!(!strict.validate(&proof.causal_chain).valid);
}
