//! Single-call address operations, grounded on `original_source/src/main.c`'s
//! `dogecoin_ecc_start`-adjacent CLI verbs (`generate_priv_pub_key_pair`,
//! `generate_hd_master_pub_key_pair`, `generate_derived_hd_pub_key`,
//! `generate_hd_master_pub_key_pair_from_mnemonic`, `verify_priv_pub_key_pair`,
//! `verify_p2pkh_address`): each one composes a handful of the lower crates'
//! primitives into the one shot a wallet CLI actually needs.

use crate::error::DogeError;
use doge_keys::hd::{bip44_path, ExtendedKey};
use doge_keys::{mnemonic, PrivateKey};
use doge_types::{ChainParams, Network};

fn params_for(is_testnet: bool) -> ChainParams {
    ChainParams::for_network(if is_testnet { Network::Testnet } else { Network::Main })
}

/// Generates a fresh private key and its WIF/P2PKH pair.
pub fn gen_priv_pub(is_testnet: bool) -> (String, String) {
    let params = params_for(is_testnet);
    let key = PrivateKey::generate();
    let wif = key.to_wif(&params);
    let address = key.public_key(true).p2pkh_address(&params);
    (wif, address)
}

/// Generates a fresh BIP32 master node from 256 bits of random seed entropy,
/// returning its base58 extended private key and the root node's own P2PKH
/// address.
pub fn gen_hd_master(is_testnet: bool) -> (String, String) {
    let params = params_for(is_testnet);
    let mut seed = [0u8; 32];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut seed);
    // A 32-byte all-zero HMAC key material is astronomically unlikely and
    // `from_seed` only fails if the derived scalar is out of range.
    let root = ExtendedKey::from_seed(&seed).expect("random 256-bit seed yields a valid secp256k1 scalar");
    let xpriv = root.to_base58(&params);
    let address = root.public_key().p2pkh_address(&params);
    (xpriv, address)
}

/// Derives the node at `child_path` (e.g. `m/0/1`) from an existing base58
/// extended private or public key, returning the child's P2PKH address. The
/// chain is inferred from `xpriv`'s own version prefix.
pub fn derive_from_xpriv(xpriv: &str, child_path: &str) -> Result<String, DogeError> {
    let version = extended_key_version(xpriv)?;
    let network = ChainParams::guess_from_bip32_priv_version(version)
        .or_else(|| guess_from_bip32_pub_version(version))
        .ok_or(DogeError::UnrecognisedExtendedKeyVersion)?;
    let params = ChainParams::for_network(network);

    let node = ExtendedKey::from_base58(xpriv, &params)?;
    let child = node.derive_path(child_path)?;
    Ok(child.public_key().p2pkh_address(&params))
}

fn guess_from_bip32_pub_version(version: u32) -> Option<Network> {
    match version {
        0x02fac_afd => Some(Network::Main),
        0x0435_87cf => Some(Network::Testnet),
        _ => None,
    }
}

fn extended_key_version(xkey: &str) -> Result<u32, DogeError> {
    let payload = doge_types::base58::decode_check(xkey)?;
    if payload.len() != 78 {
        return Err(DogeError::UnrecognisedExtendedKeyVersion);
    }
    Ok(u32::from_be_bytes(payload[0..4].try_into().unwrap()))
}

/// Derives the BIP44 external/internal account leaf at `account`/`change`/
/// `index` from a BIP39 `mnemonic` (with optional `passphrase`), returning
/// the leaf's own base58 extended private key and its P2PKH address.
pub fn gen_from_mnemonic(
    mnemonic_phrase: &str,
    passphrase: &str,
    account: u32,
    change: u32,
    index: u32,
    is_testnet: bool,
) -> Result<(String, String), DogeError> {
    mnemonic::validate(mnemonic_phrase)?;
    let params = params_for(is_testnet);
    let seed = mnemonic::to_seed(mnemonic_phrase, passphrase);
    let root = ExtendedKey::from_seed(&seed)?;
    let path = bip44_path(params.coin_type, account, change, index);
    let leaf = root.derive_path(&path)?;
    let xpriv = leaf.to_base58(&params);
    let address = leaf.public_key().p2pkh_address(&params);
    Ok((xpriv, address))
}

/// Checks that `wif` decodes to a private key whose (compressed or
/// uncompressed) public key hashes to `p2pkh`.
pub fn verify_priv_pub(wif: &str, p2pkh: &str, is_testnet: bool) -> bool {
    let params = params_for(is_testnet);
    let Ok(key) = PrivateKey::from_wif(wif, &params) else {
        return false;
    };
    key.public_key(true).p2pkh_address(&params) == p2pkh || key.public_key(false).p2pkh_address(&params) == p2pkh
}

/// Checks that `addr` is a well-formed, checksum-valid P2PKH address under
/// any of the three known chains' version bytes.
pub fn verify_p2pkh(addr: &str) -> bool {
    let Ok(payload) = doge_types::base58::decode_check(addr) else {
        return false;
    };
    if payload.len() != 21 {
        return false;
    }
    let version = payload[0];
    [Network::Main, Network::Testnet, Network::Regtest]
        .iter()
        .any(|n| ChainParams::for_network(*n).p2pkh_version == version)
}
