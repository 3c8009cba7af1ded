//! Time-ordered causal identifiers.
//!
//! Identifiers use the RFC 9562 version-7 layout: the top 48 bits carry the
//! Unix millisecond timestamp, so the canonical hex rendering sorts in
//! generation order and the timestamp can be read straight back out of the
//! string.

use std::cmp::Ordering;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::crypto::CryptoError;

/// Generate a fresh version-7 identifier in canonical 8-4-4-4-12 form.
///
/// The 74 random bits come from the platform CSPRNG; generation fails rather
/// than fall back to a weaker source.
pub fn generate() -> Result<String, CryptoError> {
    let mut random = [0u8; 10];
    getrandom::getrandom(&mut random)
        .map_err(|err| CryptoError::RandomUnavailable(err.to_string()))?;
    let id = uuid::Builder::from_unix_timestamp_millis(unix_millis(), &random).into_uuid();
    Ok(id.hyphenated().to_string())
}

/// Order two identifiers by their hex rendering.
///
/// Because the timestamp occupies the high 48 bits, lexical order equals
/// temporal order for identifiers generated in different milliseconds.
pub fn compare(a: &str, b: &str) -> Ordering {
    a.to_ascii_lowercase().cmp(&b.to_ascii_lowercase())
}

/// Read the embedded Unix millisecond timestamp (the first 12 hex nibbles).
///
/// `None` when the string is too short to contain them.
pub fn timestamp_ms(id: &str) -> Option<u64> {
    let nibbles: String = id.chars().filter(|c| *c != '-').take(12).collect();
    if nibbles.len() < 12 {
        return None;
    }
    u64::from_str_radix(&nibbles, 16).ok()
}

/// Whether a string is a canonical version-7 identifier: 8-4-4-4-12 hex with
/// the version nibble `7` and an RFC 4122 variant.
pub fn is_valid(id: &str) -> bool {
    let bytes = id.as_bytes();
    if bytes.len() != 36 {
        return false;
    }
    for (i, b) in bytes.iter().enumerate() {
        match i {
            8 | 13 | 18 | 23 => {
                if *b != b'-' {
                    return false;
                }
            }
            14 => {
                if *b != b'7' {
                    return false;
                }
            }
            19 => {
                if !matches!(b.to_ascii_lowercase(), b'8' | b'9' | b'a' | b'b') {
                    return false;
                }
            }
            _ => {
                if !b.is_ascii_hexdigit() {
                    return false;
                }
            }
        }
    }
    true
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
