//! Policy evaluation over causal chains.

use crate::policy::evaluator;
use crate::policy::types::{ChainPolicy, PolicyOutcome};
use crate::types::ChainLink;

impl ChainPolicy {
    /// Evaluate every enabled rule against a chain.
    ///
    /// All rules run; violations accumulate rather than short-circuiting.
    /// An empty chain is valid under any policy.
    pub fn validate(&self, chain: &[ChainLink]) -> PolicyOutcome {
        if chain.is_empty() {
            return PolicyOutcome::from_violations(Vec::new());
        }

        let mut violations = Vec::new();
        if self.request_must_precede_response {
            evaluator::check_request_precedes_response(chain, &mut violations);
        }
        if let Some(max_gap_ms) = self.max_time_gap_ms {
            evaluator::check_max_time_gap(chain, max_gap_ms, &mut violations);
        }
        evaluator::check_required_types(chain, &self.required_action_types, &mut violations);
        evaluator::check_forbidden_types(chain, &self.forbidden_action_types, &mut violations);
        if self.require_direct_causality {
            evaluator::check_direct_causality(chain, &mut violations);
        }
        if let Some(min_depth) = self.min_verification_depth {
            evaluator::check_min_depth(chain, min_depth, &mut violations);
        }
        PolicyOutcome::from_violations(violations)
    }
}
