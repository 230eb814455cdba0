//! Private/public key primitives, WIF encoding and ECDSA sign/verify/recover,
//! grounded on the key-handling shown in `HawalaSupp-bitcoin-key-generator`'s
//! `dogecoin_wallet.rs` (WIF layout, version bytes) and the process-wide
//! `secp256k1::Secp256k1` context pattern used throughout the retrieval pack's
//! wallet examples.

use crate::error::KeyError;
use doge_types::{hash160 as doge_hash160, ChainParams};
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature};
use secp256k1::rand::rngs::OsRng;
use secp256k1::{Message, PublicKey as Secp256k1PublicKey, Scalar, Secp256k1, SecretKey, SignOnly, VerifyOnly};
use std::sync::OnceLock;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The process-wide secp256k1 context. The source requires an explicit
/// `init()`/`shutdown()` pair around any signing or verification call; the
/// idiomatic Rust equivalent is a lazily-initialised, never-torn-down handle
/// (the underlying context holds no OS resources to release).
static SIGN_CTX: OnceLock<Secp256k1<SignOnly>> = OnceLock::new();
static VERIFY_CTX: OnceLock<Secp256k1<VerifyOnly>> = OnceLock::new();

fn sign_ctx() -> &'static Secp256k1<SignOnly> {
    SIGN_CTX.get_or_init(Secp256k1::signing_only)
}

fn verify_ctx() -> &'static Secp256k1<VerifyOnly> {
    VERIFY_CTX.get_or_init(Secp256k1::verification_only)
}

/// A 32-byte secp256k1 scalar, zeroised on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub(crate) [u8; 32]);

impl PrivateKey {
    /// Samples a uniformly random private key, retrying until the scalar is
    /// valid (any 32-byte string in (0, n) works out of the box with
    /// overwhelming probability; the retry loop exists purely to document the
    /// invariant, per B's `priv_gen`).
    pub fn generate() -> Self {
        loop {
            let sk = SecretKey::new(&mut OsRng);
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&sk[..]);
            if let Ok(key) = PrivateKey::from_bytes(bytes) {
                return key;
            }
        }
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, KeyError> {
        SecretKey::from_slice(&bytes).map_err(|_| KeyError::InvalidKey)?;
        Ok(PrivateKey(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    fn secp_key(&self) -> SecretKey {
        SecretKey::from_slice(&self.0).expect("validated at construction")
    }

    pub fn public_key(&self, compressed: bool) -> PublicKey {
        let pk = Secp256k1PublicKey::from_secret_key(sign_ctx(), &self.secp_key());
        PublicKey { inner: pk, compressed }
    }

    /// WIF encode: `base58check(version || key || 0x01 compressed-marker)`.
    pub fn to_wif(&self, params: &ChainParams) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(params.wif_version);
        payload.extend_from_slice(&self.0);
        payload.push(0x01);
        doge_types::base58::encode_check(&payload)
    }

    /// WIF decode, requiring the prefix byte to exactly match the chain's WIF version.
    pub fn from_wif(wif: &str, params: &ChainParams) -> Result<Self, KeyError> {
        let payload = doge_types::base58::decode_check(wif)?;
        if payload.len() != 34 && payload.len() != 33 {
            return Err(KeyError::WrongWifLength);
        }
        if payload[0] != params.wif_version {
            return Err(KeyError::WrongWifVersion(payload[0], params.wif_version));
        }
        let key_bytes = &payload[1..33];
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(key_bytes);
        PrivateKey::from_bytes(bytes)
    }

    /// Deterministic (RFC 6979) DER-encoded ECDSA signature.
    pub fn sign_der(&self, hash32: &[u8; 32]) -> Result<Vec<u8>, KeyError> {
        let msg = Message::from_slice(hash32).map_err(|_| KeyError::SignFailed)?;
        let mut sig = sign_ctx().sign_ecdsa(&msg, &self.secp_key());
        sig.normalize_s();
        Ok(sig.serialize_der().to_vec())
    }

    /// Deterministic compact (64-byte r||s) ECDSA signature, low-S normalised.
    pub fn sign_compact(&self, hash32: &[u8; 32]) -> Result<[u8; 64], KeyError> {
        let msg = Message::from_slice(hash32).map_err(|_| KeyError::SignFailed)?;
        let mut sig = sign_ctx().sign_ecdsa(&msg, &self.secp_key());
        sig.normalize_s();
        Ok(sig.serialize_compact())
    }

    /// Recoverable ECDSA signature: (64-byte r||s, recovery id in 0..=3).
    pub fn sign_recoverable(&self, hash32: &[u8; 32]) -> Result<([u8; 64], i32), KeyError> {
        let msg = Message::from_slice(hash32).map_err(|_| KeyError::SignFailed)?;
        let sig = sign_ctx().sign_ecdsa_recoverable(&msg, &self.secp_key());
        let (recid, bytes) = sig.serialize_compact();
        Ok((bytes, recid.to_i32()))
    }
}

/// A secp256k1 public key, tagged with whether it should be serialized
/// compressed (33 bytes) or uncompressed (65 bytes).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    inner: Secp256k1PublicKey,
    compressed: bool,
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        let compressed = match bytes.len() {
            33 => true,
            65 => false,
            _ => return Err(KeyError::InvalidPublicKey),
        };
        let inner = Secp256k1PublicKey::from_slice(bytes).map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(PublicKey { inner, compressed })
    }

    pub fn serialize(&self) -> Vec<u8> {
        if self.compressed {
            self.inner.serialize().to_vec()
        } else {
            self.inner.serialize_uncompressed().to_vec()
        }
    }

    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    pub fn with_compressed(mut self, compressed: bool) -> Self {
        self.compressed = compressed;
        self
    }

    pub fn hash160(&self) -> [u8; 20] {
        doge_hash160(&self.serialize())
    }

    /// P2PKH address for this key under the given chain parameters.
    pub fn p2pkh_address(&self, params: &ChainParams) -> String {
        let mut payload = Vec::with_capacity(21);
        payload.push(params.p2pkh_version);
        payload.extend_from_slice(&self.hash160());
        doge_types::base58::encode_check(&payload)
    }

    pub(crate) fn inner(&self) -> &Secp256k1PublicKey {
        &self.inner
    }

    /// Adds `tweak * G` to this point, used by BIP32 public CKD.
    pub fn add_exp_tweak(&self, tweak: &Scalar) -> Result<PublicKey, KeyError> {
        let inner = self
            .inner
            .add_exp_tweak(verify_ctx(), tweak)
            .map_err(|_| KeyError::InvalidPublicKey)?;
        Ok(PublicKey { inner, compressed: self.compressed })
    }
}

/// Recovers a public key from a compact signature, recovery id and digest.
pub fn recover_public_key(
    sig64: &[u8; 64],
    recid: i32,
    hash32: &[u8; 32],
    compressed: bool,
) -> Result<PublicKey, KeyError> {
    let recovery_id = RecoveryId::from_i32(recid).map_err(|_| KeyError::RecoveryFailed)?;
    let sig = RecoverableSignature::from_compact(sig64, recovery_id).map_err(|_| KeyError::RecoveryFailed)?;
    let msg = Message::from_slice(hash32).map_err(|_| KeyError::RecoveryFailed)?;
    let inner = verify_ctx().recover_ecdsa(&msg, &sig).map_err(|_| KeyError::RecoveryFailed)?;
    Ok(PublicKey { inner, compressed })
}

/// Verifies a DER signature against a public key and digest.
pub fn verify_der(pubkey: &PublicKey, hash32: &[u8; 32], der_sig: &[u8]) -> bool {
    let Ok(msg) = Message::from_slice(hash32) else {
        return false;
    };
    let Ok(sig) = Signature::from_der(der_sig) else {
        return false;
    };
    verify_ctx().verify_ecdsa(&msg, &sig, pubkey.inner()).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use doge_types::Network;

    #[test]
    fn wif_round_trips() {
        let params = ChainParams::for_network(Network::Main);
        let key = PrivateKey::from_bytes([1u8; 32]).unwrap();
        let wif = key.to_wif(&params);
        let decoded = PrivateKey::from_wif(&wif, &params).unwrap();
        assert_eq!(decoded.as_bytes(), key.as_bytes());
    }

    #[test]
    fn wif_rejects_wrong_chain() {
        let main = ChainParams::for_network(Network::Main);
        let test = ChainParams::for_network(Network::Testnet);
        let key = PrivateKey::from_bytes([1u8; 32]).unwrap();
        let wif = key.to_wif(&main);
        assert!(matches!(
            PrivateKey::from_wif(&wif, &test),
            Err(KeyError::WrongWifVersion(_, _))
        ));
    }

    #[test]
    fn sign_and_verify_round_trip() {
        let key = PrivateKey::from_bytes([7u8; 32]).unwrap();
        let pubkey = key.public_key(true);
        let hash = [42u8; 32];
        let der = key.sign_der(&hash).unwrap();
        assert!(verify_der(&pubkey, &hash, &der));
        let mut tampered = hash;
        tampered[0] ^= 1;
        assert!(!verify_der(&pubkey, &tampered, &der));
    }

    #[test]
    fn recoverable_signature_recovers_matching_pubkey() {
        let key = PrivateKey::from_bytes([9u8; 32]).unwrap();
        let pubkey = key.public_key(true);
        let hash = [3u8; 32];
        let (sig, recid) = key.sign_recoverable(&hash).unwrap();
        let recovered = recover_public_key(&sig, recid, &hash, true).unwrap();
        assert_eq!(recovered.serialize(), pubkey.serialize());
    }
}
