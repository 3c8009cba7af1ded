//! Proof generation errors.

use thiserror::Error;

use crate::causal::merkle::MerkleError;
use crate::crypto::CryptoError;

/// Why a proof could not be generated.
#[derive(Debug, Error)]
pub enum ProofError {
    #[error("unknown causal event id: {0}")]
    UnknownEvent(String),

    #[error(transparent)]
    Merkle(#[from] MerkleError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}
