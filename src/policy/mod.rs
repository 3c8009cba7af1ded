//! Declarative semantic rules over causal chains.
//!
//! Rules describe what a well-behaved chain looks like (ordering, pacing,
//! composition); the verifier establishes that the chain is authentic, the
//! policy establishes that it is acceptable.

mod engine;
mod evaluator;
pub mod types;

pub use types::{ChainPolicy, PolicyOutcome};
