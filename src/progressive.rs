//! Progressive trust: a cheap metadata check now, full cryptography later.
//!
//! The light check looks only at the proof summary (agent, freshness, chain
//! shape) and answers in microseconds. The full check is cooperatively
//! deferred: it runs on a later scheduler tick, after the synchronous caller
//! has already returned with an admission decision.

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::trace;

use crate::types::{CausalProof, LightProof};
use crate::verifier::{verify_proof, VerificationReport};

/// Default freshness window for a light proof, in ms.
pub const DEFAULT_MAX_AGE_MS: i64 = 300_000;

/// Default minimum chain length for the light check.
pub const DEFAULT_MIN_DEPTH: usize = 3;

/// Trust granted on a passing light check, before full verification lands.
pub const IMMEDIATE_TRUST_ON_PASS: f64 = 0.7;

/// Tunables for the light check.
#[derive(Clone, Debug)]
pub struct LightCheckOptions {
    pub min_depth: usize,
    pub max_age_ms: i64,
}

impl Default for LightCheckOptions {
    fn default() -> Self {
        Self {
            min_depth: DEFAULT_MIN_DEPTH,
            max_age_ms: DEFAULT_MAX_AGE_MS,
        }
    }
}

/// Result of the fast metadata check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LightOutcome {
    pub passed: bool,
    pub failures: Vec<String>,
}

/// Run the fast, non-cryptographic check on a light proof.
pub fn verify_light(
    light: &LightProof,
    expected_agent_id: &str,
    options: &LightCheckOptions,
) -> LightOutcome {
    let mut failures = Vec::new();

    if light.agent_id != expected_agent_id {
        failures.push(format!(
            "agent mismatch: expected {expected_agent_id}, got {}",
            light.agent_id
        ));
    }

    let age_ms = crate::now_ms() - light.timestamp;
    if age_ms > options.max_age_ms {
        failures.push(format!(
            "light proof is {age_ms} ms old, exceeding the {} ms freshness window",
            options.max_age_ms
        ));
    }

    if light.causal_chain.len() < options.min_depth {
        failures.push(format!(
            "chain depth {} is below the required minimum of {}",
            light.causal_chain.len(),
            options.min_depth
        ));
    }

    if !light
        .causal_chain
        .iter()
        .any(|link| link.event_hash == light.target_event_hash)
    {
        failures.push("target event digest does not appear in the chain".to_owned());
    }
    match light.causal_chain.last() {
        Some(last) if last.event_hash == light.target_event_hash => {}
        _ => failures.push("target event digest is not the final chain element".to_owned()),
    }

    for position in 1..light.causal_chain.len() {
        if light.causal_chain[position].timestamp < light.causal_chain[position - 1].timestamp {
            failures.push(format!(
                "chain timestamps regress at position {position}"
            ));
        }
    }

    LightOutcome {
        passed: failures.is_empty(),
        failures,
    }
}

/// Why a request was refused at the admission step.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    LightVerificationFailed,
    HighValueRequiresFullVerification,
}

impl RefusalReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefusalReason::LightVerificationFailed => "light_verification_failed",
            RefusalReason::HighValueRequiresFullVerification => {
                "high_value_requires_full_verification"
            }
        }
    }
}

impl std::fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a full verification was handed to the scheduler.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferredStatus {
    Pending,
    NotScheduled,
}

/// The proofs a caller presents: the light summary, optionally the full proof.
#[derive(Clone, Debug)]
pub struct ProofBundle {
    pub light: LightProof,
    pub full: Option<CausalProof>,
}

/// What the consumer knows about the claimed agent.
#[derive(Clone, Debug)]
pub struct VerifyContext {
    pub agent_id: String,
    /// Required for the deferred full verification; the light check never
    /// touches key material.
    pub public_key: Option<String>,
}

/// Progressive verification tunables.
#[derive(Clone, Debug)]
pub struct ProgressiveOptions {
    pub auto_verify_full: bool,
    /// High-value requests are never admitted on the light check alone.
    pub is_high_value: bool,
    pub min_depth: usize,
    pub max_age_ms: i64,
}

impl Default for ProgressiveOptions {
    fn default() -> Self {
        Self {
            auto_verify_full: true,
            is_high_value: false,
            min_depth: DEFAULT_MIN_DEPTH,
            max_age_ms: DEFAULT_MAX_AGE_MS,
        }
    }
}

/// The immediate admission decision plus a handle to the deferred check.
#[derive(Debug)]
pub struct ProgressiveDecision {
    pub can_proceed: bool,
    pub reason: Option<RefusalReason>,
    /// [`IMMEDIATE_TRUST_ON_PASS`] when the light check passed, else 0.
    pub immediate_trust: f64,
    pub light_failures: Vec<String>,
    pub deferred_status: DeferredStatus,
    /// Resolves to the full [`VerificationReport`] once the deferred check
    /// has run. `None` when nothing was scheduled.
    pub deferred: Option<JoinHandle<VerificationReport>>,
}

/// Run the light check synchronously and, when possible, schedule the full
/// check for a later scheduler tick.
///
/// # Panics
///
/// Panics if a full verification is scheduled while no tokio runtime is
/// active. Callers outside a runtime should pass `auto_verify_full: false`
/// and run [`verify_proof`] themselves.
pub fn assess(
    bundle: ProofBundle,
    context: &VerifyContext,
    options: &ProgressiveOptions,
) -> ProgressiveDecision {
    let light_options = LightCheckOptions {
        min_depth: options.min_depth,
        max_age_ms: options.max_age_ms,
    };
    let light = verify_light(&bundle.light, &context.agent_id, &light_options);

    let immediate_trust = if light.passed {
        IMMEDIATE_TRUST_ON_PASS
    } else {
        0.0
    };
    let (can_proceed, reason) = if options.is_high_value {
        (false, Some(RefusalReason::HighValueRequiresFullVerification))
    } else if light.passed {
        (true, None)
    } else {
        (false, Some(RefusalReason::LightVerificationFailed))
    };

    let mut deferred_status = DeferredStatus::NotScheduled;
    let mut deferred = None;
    if options.auto_verify_full {
        if let (Some(full), Some(public_key)) = (bundle.full, context.public_key.clone()) {
            let agent_id = context.agent_id.clone();
            trace!(agent = %agent_id, "scheduling deferred full verification");
            deferred = Some(tokio::spawn(async move {
                verify_proof(&full, &agent_id, &public_key)
            }));
            deferred_status = DeferredStatus::Pending;
        }
    }

    ProgressiveDecision {
        can_proceed,
        reason,
        immediate_trust,
        light_failures: light.failures,
        deferred_status,
        deferred,
    }
}
