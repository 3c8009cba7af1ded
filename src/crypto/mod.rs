//! Cryptographic primitives: SHA3-256 digests and secp256k1 ECDSA.
//!
//! These are part of the core contract — the log's guarantees only hold if
//! digests and signatures are bit-exact across implementations.

pub mod ecdsa;
pub mod hash;

use thiserror::Error;

/// Failures from key handling and signing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The platform has no cryptographically secure random source. Key and
    /// identifier generation refuse to degrade to a weaker source.
    #[error("secure random source unavailable: {0}")]
    RandomUnavailable(String),

    #[error("invalid private key scalar")]
    InvalidPrivateKey,

    #[error("message hash is not a 32-byte hex digest")]
    InvalidMessageHash,

    #[error("signing failed")]
    SigningFailed,
}

pub use ecdsa::{generate_private_key, public_key, recover_public_key, sign, verify};
pub use hash::{sha3, sha3_concat, sorted_pair, HashPart};
