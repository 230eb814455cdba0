//! BIP32 hierarchical-deterministic extended keys, grounded on
//! `original_source/src/bip32.c`'s `dogecoin_hdnode_*` family (seed -> master,
//! private/public CKD, base58 (de)serialization) and the sum-type shape
//! SPEC_FULL.md's design notes call for: shared node metadata plus a
//! private/public key-material variant, rather than threading an
//! `Option<PrivateKey>` through one struct.

use crate::error::HdError;
use crate::keys::{PrivateKey, PublicKey};
use doge_types::{hash160 as doge_hash160, ChainParams};
use hmac::{Hmac, Mac};
use secp256k1::{Scalar, SecretKey};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

const HARDENED_FLAG: u32 = 0x8000_0000;

/// Fixed metadata every BIP32 node carries, independent of whether it holds
/// private or public key material.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeMeta {
    pub depth: u8,
    pub parent_fingerprint: [u8; 4],
    pub child_index: u32,
    pub chain_code: [u8; 32],
}

/// The key-payload half of an HD node: either the 32-byte private scalar or a
/// public-only key, for watch-only derivation.
#[derive(Clone)]
pub enum KeyMaterial {
    Private(PrivateKey),
    Public(PublicKey),
}

/// A BIP32 extended node: shared metadata plus one of the two key-material
/// variants.
#[derive(Clone)]
pub struct ExtendedKey {
    pub meta: NodeMeta,
    pub key: KeyMaterial,
}

impl ExtendedKey {
    /// Derives the root node from a BIP32 seed: `HMAC-SHA512(key = "Dogecoin
    /// seed", data = seed)`, split into the root's private key and chain code.
    pub fn from_seed(seed: &[u8]) -> Result<Self, HdError> {
        let mut mac = HmacSha512::new_from_slice(b"Dogecoin seed").expect("hmac accepts any key length");
        mac.update(seed);
        let i = mac.finalize().into_bytes();
        let (il, ir) = i.split_at(32);

        let mut priv_bytes = [0u8; 32];
        priv_bytes.copy_from_slice(il);
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(ir);

        let private_key = PrivateKey::from_bytes(priv_bytes)?;
        Ok(ExtendedKey {
            meta: NodeMeta {
                depth: 0,
                parent_fingerprint: [0u8; 4],
                child_index: 0,
                chain_code,
            },
            key: KeyMaterial::Private(private_key),
        })
    }

    pub fn is_private(&self) -> bool {
        matches!(self.key, KeyMaterial::Private(_))
    }

    /// The node's public key, always compressed (BIP32 never serializes an
    /// uncompressed key).
    pub fn public_key(&self) -> PublicKey {
        match &self.key {
            KeyMaterial::Private(sk) => sk.public_key(true),
            KeyMaterial::Public(pk) => pk.with_compressed(true),
        }
    }

    /// Strips the private key, yielding a public-only node with identical
    /// metadata -- used to hand out a watch-only subtree.
    pub fn neuter(&self) -> ExtendedKey {
        ExtendedKey {
            meta: self.meta.clone(),
            key: KeyMaterial::Public(self.public_key()),
        }
    }

    /// Leading 4 bytes of `hash160(pubkey)`, used as the *parent* fingerprint
    /// a direct child stamps into its own metadata.
    pub fn fingerprint(&self) -> [u8; 4] {
        let hash = doge_hash160(&self.public_key().serialize());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Child key derivation. Hardened indices (`index >= 2^31`) require a
    /// private node; non-hardened derivation works from either variant.
    pub fn derive_child(&self, index: u32) -> Result<ExtendedKey, HdError> {
        let hardened = index & HARDENED_FLAG != 0;
        let parent_chain_code = self.meta.chain_code;
        let parent_pub_compressed = self.public_key().serialize();

        let mut mac = HmacSha512::new_from_slice(&parent_chain_code).expect("hmac accepts any key length");

        let child_meta_base = NodeMeta {
            depth: self.meta.depth.checked_add(1).ok_or(HdError::DerivationFailed)?,
            parent_fingerprint: self.fingerprint(),
            child_index: index,
            chain_code: [0u8; 32],
        };

        match &self.key {
            KeyMaterial::Private(sk) => {
                if hardened {
                    mac.update(&[0x00]);
                    mac.update(sk.as_bytes());
                } else {
                    mac.update(&parent_pub_compressed);
                }
                mac.update(&index.to_be_bytes());
                let i = mac.finalize().into_bytes();
                let (il, ir) = i.split_at(32);

                let tweak = Scalar::from_be_bytes(il.try_into().unwrap()).map_err(|_| HdError::DerivationFailed)?;
                let parent_secret = SecretKey::from_slice(sk.as_bytes()).map_err(|_| HdError::DerivationFailed)?;
                let child_secret = parent_secret.add_tweak(&tweak).map_err(|_| HdError::DerivationFailed)?;

                let mut child_priv_bytes = [0u8; 32];
                child_priv_bytes.copy_from_slice(&child_secret[..]);
                let mut chain_code = [0u8; 32];
                chain_code.copy_from_slice(ir);

                Ok(ExtendedKey {
                    meta: NodeMeta { chain_code, ..child_meta_base },
                    key: KeyMaterial::Private(PrivateKey::from_bytes(child_priv_bytes).map_err(|_| HdError::DerivationFailed)?),
                })
            }
            KeyMaterial::Public(pk) => {
                if hardened {
                    return Err(HdError::HardenedFromPublic);
                }
                mac.update(&parent_pub_compressed);
                mac.update(&index.to_be_bytes());
                let i = mac.finalize().into_bytes();
                let (il, ir) = i.split_at(32);

                let tweak = Scalar::from_be_bytes(il.try_into().unwrap()).map_err(|_| HdError::DerivationFailed)?;
                let child_pub = pk.add_exp_tweak(&tweak).map_err(|_| HdError::DerivationFailed)?;

                let mut chain_code = [0u8; 32];
                chain_code.copy_from_slice(ir);

                Ok(ExtendedKey {
                    meta: NodeMeta { chain_code, ..child_meta_base },
                    key: KeyMaterial::Public(child_pub),
                })
            }
        }
    }

    /// Derives along a full path (e.g. `m/44'/3'/0'/0/0`) from this node,
    /// which is treated as the path's `m`.
    pub fn derive_path(&self, path: &str) -> Result<ExtendedKey, HdError> {
        let indices = parse_path(path)?;
        let mut node = self.clone();
        for index in indices {
            node = node.derive_child(index)?;
        }
        Ok(node)
    }

    /// 78-byte base58check serialization; version prefix selects private vs.
    /// public per `params`.
    pub fn to_base58(&self, params: &ChainParams) -> String {
        let mut payload = Vec::with_capacity(78);
        let version = match &self.key {
            KeyMaterial::Private(_) => params.bip32_priv_version,
            KeyMaterial::Public(_) => params.bip32_pub_version,
        };
        payload.extend_from_slice(&version.to_be_bytes());
        payload.push(self.meta.depth);
        payload.extend_from_slice(&self.meta.parent_fingerprint);
        payload.extend_from_slice(&self.meta.child_index.to_be_bytes());
        payload.extend_from_slice(&self.meta.chain_code);
        match &self.key {
            KeyMaterial::Private(sk) => {
                payload.push(0x00);
                payload.extend_from_slice(sk.as_bytes());
            }
            KeyMaterial::Public(pk) => {
                payload.extend_from_slice(&pk.with_compressed(true).serialize());
            }
        }
        doge_types::base58::encode_check(&payload)
    }

    /// Inverse of [`ExtendedKey::to_base58`]. Rejects a private-tagged blob
    /// whose key-material leading byte isn't `0x00` (SPEC_FULL.md 3).
    pub fn from_base58(s: &str, params: &ChainParams) -> Result<ExtendedKey, HdError> {
        let payload = doge_types::base58::decode_check(s)?;
        if payload.len() != 78 {
            return Err(HdError::WrongLength);
        }
        let version = u32::from_be_bytes(payload[0..4].try_into().unwrap());
        let depth = payload[4];
        let mut parent_fingerprint = [0u8; 4];
        parent_fingerprint.copy_from_slice(&payload[5..9]);
        let child_index = u32::from_be_bytes(payload[9..13].try_into().unwrap());
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&payload[13..45]);
        let key_bytes = &payload[45..78];
        let meta = NodeMeta { depth, parent_fingerprint, child_index, chain_code };

        if version == params.bip32_priv_version {
            if key_bytes[0] != 0x00 {
                return Err(HdError::MissingPrivateTag);
            }
            let mut priv_bytes = [0u8; 32];
            priv_bytes.copy_from_slice(&key_bytes[1..33]);
            let sk = PrivateKey::from_bytes(priv_bytes)?;
            Ok(ExtendedKey { meta, key: KeyMaterial::Private(sk) })
        } else if version == params.bip32_pub_version {
            let pk = PublicKey::from_bytes(key_bytes)?;
            Ok(ExtendedKey { meta, key: KeyMaterial::Public(pk) })
        } else {
            Err(HdError::UnknownVersion(version))
        }
    }
}

/// Parses `m/44'/3'/0'/0/0`-style paths into their raw (possibly hardened)
/// indices. `'`, `h`, `H` and `p` are all accepted hardened markers.
pub fn parse_path(path: &str) -> Result<Vec<u32>, HdError> {
    let mut segments = path.split('/');
    let first = segments.next().unwrap_or("");
    if first != "m" {
        return Err(HdError::PathMustStartWithM);
    }

    let mut indices = Vec::new();
    for segment in segments {
        if segment.is_empty() {
            return Err(HdError::BadPathSegment(segment.to_string()));
        }
        let (digits, hardened) = match segment.strip_suffix(['\'', 'h', 'H', 'p']) {
            Some(stripped) => (stripped, true),
            None => (segment, false),
        };
        let index: u32 = digits.parse().map_err(|_| HdError::BadPathSegment(segment.to_string()))?;
        if index & HARDENED_FLAG != 0 {
            return Err(HdError::BadPathSegment(segment.to_string()));
        }
        indices.push(if hardened { index | HARDENED_FLAG } else { index });
    }
    Ok(indices)
}

/// Builds a BIP44 path string: `m/44'/coin_type'/account'/change/index`.
pub fn bip44_path(coin_type: u32, account: u32, change: u32, index: u32) -> String {
    format!("m/44'/{coin_type}'/{account}'/{change}/{index}")
}
