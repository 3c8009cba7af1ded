//! Rule definitions for causal chain validation.

use serde::{Deserialize, Serialize};

use crate::causal::event::ActionType;

/// Declarative rule set evaluated over a causal chain.
///
/// The default policy enforces nothing; callers switch on the rules they
/// need. An empty chain is valid under every policy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChainPolicy {
    /// Every `response` must be preceded by at least one `request`.
    pub request_must_precede_response: bool,
    /// Upper bound on the timestamp difference between adjacent elements.
    pub max_time_gap_ms: Option<i64>,
    /// Action types that must each appear somewhere in the chain.
    pub required_action_types: Vec<ActionType>,
    /// Action types that may not appear at all.
    pub forbidden_action_types: Vec<ActionType>,
    /// Each non-first element's predecessor must be the previous element.
    pub require_direct_causality: bool,
    /// Minimum chain length.
    pub min_verification_depth: Option<usize>,
}

/// Result of evaluating a [`ChainPolicy`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyOutcome {
    pub valid: bool,
    /// One human-readable line per violated rule instance.
    pub violations: Vec<String>,
}

impl PolicyOutcome {
    pub(crate) fn from_violations(violations: Vec<String>) -> Self {
        Self {
            valid: violations.is_empty(),
            violations,
        }
    }
}
