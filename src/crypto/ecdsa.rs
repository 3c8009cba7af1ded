//! secp256k1 ECDSA for agent signatures.
//!
//! Key and signature material crosses this boundary as `0x`-prefixed hex:
//! private keys are 32-byte scalars, public keys are uncompressed SEC1 points
//! (`0x04 || X || Y`), signatures are `r || s`. Signing derives the nonce
//! deterministically (RFC 6979) and always emits the low-s form; verification
//! rejects high-s signatures outright so a malleated twin of a valid
//! signature never validates.

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use zeroize::Zeroize;

use super::CryptoError;

/// Generate a fresh private key scalar in `[1, n-1]`, hex-encoded.
///
/// Fails when the platform provides no cryptographically secure random
/// source; there is no weaker fallback.
pub fn generate_private_key() -> Result<String, CryptoError> {
    for _ in 0..128 {
        let mut bytes = [0u8; 32];
        getrandom::getrandom(&mut bytes)
            .map_err(|err| CryptoError::RandomUnavailable(err.to_string()))?;
        let candidate = SigningKey::from_bytes(&bytes.into());
        bytes.zeroize();
        if let Ok(key) = candidate {
            return Ok(format!("0x{}", hex::encode(key.to_bytes())));
        }
        // Zero or >= n; redraw.
    }
    Err(CryptoError::InvalidPrivateKey)
}

/// Derive the uncompressed public key (`0x04 || X || Y`) for a private key.
pub fn public_key(private_key_hex: &str) -> Result<String, CryptoError> {
    let key = parse_signing_key(private_key_hex)?;
    Ok(encode_verifying_key(key.verifying_key()))
}

/// Sign a 32-byte message digest, returning `0x || r || s` in low-s form.
pub fn sign(message_hash_hex: &str, private_key_hex: &str) -> Result<String, CryptoError> {
    let digest = parse_message_digest(message_hash_hex).ok_or(CryptoError::InvalidMessageHash)?;
    let key = parse_signing_key(private_key_hex)?;
    let signature: Signature = key
        .sign_prehash(&digest)
        .map_err(|_| CryptoError::SigningFailed)?;
    let signature = signature.normalize_s().unwrap_or(signature);
    Ok(format!("0x{}", hex::encode(signature.to_bytes())))
}

/// Verify an `r || s` signature over a 32-byte message digest.
///
/// Returns `false` for malformed inputs, scalars outside `(0, n)`, high-s
/// signatures, and genuine verification failures alike.
pub fn verify(message_hash_hex: &str, signature_hex: &str, public_key_hex: &str) -> bool {
    let Some(digest) = parse_message_digest(message_hash_hex) else {
        return false;
    };
    let Some(signature) = parse_signature(signature_hex) else {
        return false;
    };
    if signature.normalize_s().is_some() {
        // High-s twin of a canonical signature.
        return false;
    }
    let Some(key) = parse_verifying_key(public_key_hex) else {
        return false;
    };
    key.verify_prehash(&digest, &signature).is_ok()
}

/// Recover the uncompressed public key from a signature and recovery bit.
///
/// `None` for malformed inputs, recovery ids outside `{0, 1}`, or candidate
/// points that do not lie on the curve.
pub fn recover_public_key(
    message_hash_hex: &str,
    signature_hex: &str,
    recovery_id: u8,
) -> Option<String> {
    if recovery_id > 1 {
        return None;
    }
    let digest = parse_message_digest(message_hash_hex)?;
    let signature = parse_signature(signature_hex)?;
    let recovery = RecoveryId::from_byte(recovery_id)?;
    let key = VerifyingKey::recover_from_prehash(&digest, &signature, recovery).ok()?;
    Some(encode_verifying_key(&key))
}

fn encode_verifying_key(key: &VerifyingKey) -> String {
    format!("0x{}", hex::encode(key.to_encoded_point(false).as_bytes()))
}

fn parse_signing_key(private_key_hex: &str) -> Result<SigningKey, CryptoError> {
    let stripped = private_key_hex
        .strip_prefix("0x")
        .unwrap_or(private_key_hex);
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(stripped, &mut bytes).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let key = SigningKey::from_bytes(&bytes.into()).map_err(|_| CryptoError::InvalidPrivateKey);
    bytes.zeroize();
    key
}

fn parse_verifying_key(public_key_hex: &str) -> Option<VerifyingKey> {
    let stripped = public_key_hex.strip_prefix("0x").unwrap_or(public_key_hex);
    let bytes = hex::decode(stripped).ok()?;
    VerifyingKey::from_sec1_bytes(&bytes).ok()
}

fn parse_signature(signature_hex: &str) -> Option<Signature> {
    let stripped = signature_hex.strip_prefix("0x").unwrap_or(signature_hex);
    let bytes = hex::decode(stripped).ok()?;
    if bytes.len() != 64 {
        return None;
    }
    // from_slice rejects zero scalars and scalars >= n.
    Signature::from_slice(&bytes).ok()
}

fn parse_message_digest(message_hash_hex: &str) -> Option<[u8; 32]> {
    let stripped = message_hash_hex
        .strip_prefix("0x")
        .unwrap_or(message_hash_hex);
    let mut out = [0u8; 32];
    hex::decode_to_slice(stripped, &mut out).ok()?;
    Some(out)
}
