//! Deterministic evaluators, one per chain rule.

use crate::causal::event::ActionType;
use crate::types::ChainLink;

pub(crate) fn check_request_precedes_response(chain: &[ChainLink], violations: &mut Vec<String>) {
    let mut request_seen = false;
    for (position, link) in chain.iter().enumerate() {
        match link.action_type {
            ActionType::Request => request_seen = true,
            ActionType::Response if !request_seen => violations.push(format!(
                "response at position {position} has no preceding request"
            )),
            _ => {}
        }
    }
}

pub(crate) fn check_max_time_gap(chain: &[ChainLink], max_gap_ms: i64, violations: &mut Vec<String>) {
    for position in 1..chain.len() {
        let gap = (chain[position].timestamp - chain[position - 1].timestamp).abs();
        if gap > max_gap_ms {
            violations.push(format!(
                "time gap of {gap} ms between positions {} and {position} exceeds the {max_gap_ms} ms limit",
                position - 1
            ));
        }
    }
}

pub(crate) fn check_required_types(
    chain: &[ChainLink],
    required: &[ActionType],
    violations: &mut Vec<String>,
) {
    for action in required {
        if !chain.iter().any(|link| link.action_type == *action) {
            violations.push(format!("required action type {action} never appears"));
        }
    }
}

pub(crate) fn check_forbidden_types(
    chain: &[ChainLink],
    forbidden: &[ActionType],
    violations: &mut Vec<String>,
) {
    for action in forbidden {
        if let Some(position) = chain.iter().position(|link| link.action_type == *action) {
            violations.push(format!(
                "forbidden action type {action} appears at position {position}"
            ));
        }
    }
}

pub(crate) fn check_direct_causality(chain: &[ChainLink], violations: &mut Vec<String>) {
    for position in 1..chain.len() {
        if chain[position].predecessor_hash.as_ref() != Some(&chain[position - 1].event_hash) {
            violations.push(format!(
                "direct causality broken between positions {} and {position}",
                position - 1
            ));
        }
    }
}

pub(crate) fn check_min_depth(chain: &[ChainLink], min_depth: usize, violations: &mut Vec<String>) {
    if chain.len() < min_depth {
        violations.push(format!(
            "chain depth {} is below the required minimum of {min_depth}",
            chain.len()
        ));
    }
}
