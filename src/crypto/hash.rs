//! SHA3-256 digests and the separator-joined concat digest.
//!
//! The concat recipe is a compatibility contract: every part is fed to the
//! hasher followed by the two-byte separator `||` (after the last part too),
//! and an absent part contributes the literal four bytes `null`. Digests
//! produced here must validate against digests computed by any other
//! conforming implementation, byte for byte.

use sha3::{Digest as Sha3Digest, Sha3_256};

use crate::types::Digest;

/// Separator appended after every part of a concat digest.
const SEPARATOR: &[u8] = b"||";

/// Hashed form of an absent part.
const ABSENT: &[u8] = b"null";

/// One input to [`sha3_concat`].
#[derive(Copy, Clone, Debug)]
pub enum HashPart<'a> {
    /// UTF-8 bytes of a string.
    Str(&'a str),
    /// Raw bytes.
    Bytes(&'a [u8]),
    /// An absent value; hashes as the literal bytes `null`.
    Absent,
}

impl<'a> From<Option<&'a str>> for HashPart<'a> {
    fn from(value: Option<&'a str>) -> Self {
        match value {
            Some(s) => HashPart::Str(s),
            None => HashPart::Absent,
        }
    }
}

/// SHA3-256 of raw bytes, rendered as a `0x`-prefixed lowercase hex digest.
pub fn sha3(data: &[u8]) -> Digest {
    let mut hasher = Sha3_256::new();
    hasher.update(data);
    to_digest(hasher)
}

/// SHA3-256 over parts joined by `||`, with a trailing separator.
pub fn sha3_concat(parts: &[HashPart<'_>]) -> Digest {
    let mut hasher = Sha3_256::new();
    for part in parts {
        match part {
            HashPart::Str(s) => hasher.update(s.as_bytes()),
            HashPart::Bytes(b) => hasher.update(b),
            HashPart::Absent => hasher.update(ABSENT),
        }
        hasher.update(SEPARATOR);
    }
    to_digest(hasher)
}

/// Order-insensitive pair combiner for Merkle nodes.
///
/// The smaller digest (lexical comparison on the transport string, `0x`
/// prefix included) is hashed first, so `pair(a, b) == pair(b, a)`.
pub fn sorted_pair(a: &Digest, b: &Digest) -> Digest {
    let (lo, hi) = if a.as_str() <= b.as_str() { (a, b) } else { (b, a) };
    sha3_concat(&[HashPart::Str(lo.as_str()), HashPart::Str(hi.as_str())])
}

fn to_digest(hasher: Sha3_256) -> Digest {
    let bytes: [u8; 32] = hasher.finalize().into();
    Digest::new(format!("0x{}", hex::encode(bytes)))
}
