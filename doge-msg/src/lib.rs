//! Signed-message envelope: a framed length-prefixed digest, a recoverable
//! ECDSA signature and its base64 serialization, verifiable back to a
//! P2PKH address without the verifier needing to know the signer's public
//! key up front. Grounded on `original_source/src/main.c`'s
//! `dogecoin_ecc_sign_message`/`dogecoin_ecc_verify_message` family, which
//! itself mirrors Bitcoin Core's legacy `signmessage`/`verifymessage` RPCs.

pub mod error;

pub use error::MsgError;

use base64::{engine::general_purpose::STANDARD, Engine};
use doge_types::codec::write_varint;
use doge_types::{double_sha256, hash160 as doge_hash160, H256};
use doge_keys::{recover_public_key, PrivateKey};

const MESSAGE_PREFIX: &str = "Dogecoin Signed Message:\n";

/// Builds the framed preimage `len(prefix) || prefix || len(message) ||
/// message` and returns its double-SHA256 digest. Both length prefixes are
/// CompactSize varints; for any message under 253 bytes (the overwhelming
/// common case) that's a single length byte, matching the historical
/// Bitcoin/Dogecoin wire convention this scheme was ported from.
pub fn message_digest(message: &str) -> H256 {
    let mut preimage = Vec::with_capacity(MESSAGE_PREFIX.len() + message.len() + 2);
    write_varint(&mut preimage, MESSAGE_PREFIX.len() as u64);
    preimage.extend_from_slice(MESSAGE_PREFIX.as_bytes());
    write_varint(&mut preimage, message.len() as u64);
    preimage.extend_from_slice(message.as_bytes());
    double_sha256(&preimage)
}

/// Signs `message` with `key`, returning the 88-character base64 envelope.
/// `compressed` selects whether the recovery header advertises a compressed
/// public key (the caller must pass the same flag at verification time
/// implicitly, via whichever key serialization `address` was derived from).
pub fn sign_message(key: &PrivateKey, message: &str, compressed: bool) -> Result<String, MsgError> {
    let digest = message_digest(message);
    let (sig64, recid) = key.sign_recoverable(&digest.0)?;
    let header = 27u8 + recid as u8 + if compressed { 4 } else { 0 };

    let mut envelope = Vec::with_capacity(65);
    envelope.push(header);
    envelope.extend_from_slice(&sig64);
    Ok(STANDARD.encode(envelope))
}

/// Verifies a base64 signed-message envelope against `message` and a P2PKH
/// `address`. Resolves compression and recovery id from the envelope's
/// header byte, recovers the signer's public key, and rebuilds the P2PKH
/// address under the *address's own* version byte before comparing -- this
/// crate never needs a `ChainParams` to verify, only to sign.
pub fn verify_message(sig_b64: &str, message: &str, address: &str) -> Result<bool, MsgError> {
    let envelope = STANDARD.decode(sig_b64).map_err(|_| MsgError::InvalidBase64)?;
    if envelope.len() != 65 {
        return Err(MsgError::WrongEnvelopeLength);
    }
    let header = envelope[0];
    if !(27..=42).contains(&header) {
        return Err(MsgError::InvalidHeaderByte(header));
    }
    let compressed = header >= 31;
    let recid = ((header - 27) % 4) as i32;

    let mut sig64 = [0u8; 64];
    sig64.copy_from_slice(&envelope[1..]);

    let digest = message_digest(message);
    let recovered = match recover_public_key(&sig64, recid, &digest.0, compressed) {
        Ok(pk) => pk,
        Err(_) => return Ok(false),
    };

    let decoded = doge_types::base58::decode_check(address)?;
    if decoded.len() != 21 {
        return Ok(false);
    }
    let version = decoded[0];
    let mut candidate = Vec::with_capacity(21);
    candidate.push(version);
    candidate.extend_from_slice(&doge_hash160(&recovered.serialize()));
    let candidate_address = doge_types::base58::encode_check(&candidate);

    Ok(candidate_address == address)
}
