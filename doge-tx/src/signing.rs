//! Input signing: sighash + ECDSA sign + scriptSig assembly for P2PKH
//! spends, grounded on `original_source/src/transaction.c`'s
//! `dogecoin_tx_sign_input` (push signature-plus-hashtype, push pubkey).

use crate::error::TxError;
use crate::sighash::compute_sighash;
use crate::tx::Transaction;
use doge_keys::PrivateKey;
use doge_types::ChainParams;

/// Signs `tx.vin[in_num]` against `prev_script` under `hashtype`, replacing
/// its `script_sig` with `push(der_sig || hashtype) || push(pubkey)`.
pub fn sign_input(
    tx: &mut Transaction,
    in_num: usize,
    prev_script: &[u8],
    hashtype: u8,
    key: &PrivateKey,
) -> Result<(), TxError> {
    if in_num >= tx.vin.len() {
        return Err(TxError::InputIndexOutOfRange(in_num, tx.vin.len()));
    }

    let sighash = compute_sighash(tx, prev_script, in_num, hashtype);
    let mut der = key.sign_der(&sighash.0)?;
    der.push(hashtype);

    let pubkey = key.public_key(true).serialize();

    let mut script_sig = Vec::with_capacity(der.len() + pubkey.len() + 2);
    doge_script::push(&mut script_sig, &der);
    doge_script::push(&mut script_sig, &pubkey);

    tx.vin[in_num].script_sig = script_sig;
    Ok(())
}

/// Signs every input of `tx`, one prevout script and amount per input, all
/// under the same hashtype and key. `prev_scripts` and `_amounts_koinu` must
/// both have one entry per input (amounts are accepted for API symmetry with
/// `sign_input` call sites that need them for segwit-style sighashes; legacy
/// sighash itself does not consume the spent amount).
pub fn sign_all_inputs(
    tx: &mut Transaction,
    prev_scripts: &[Vec<u8>],
    hashtype: u8,
    key: &PrivateKey,
) -> Result<(), TxError> {
    if prev_scripts.len() != tx.vin.len() {
        return Err(TxError::AmountArityMismatch(prev_scripts.len(), tx.vin.len()));
    }
    for i in 0..tx.vin.len() {
        sign_input(tx, i, &prev_scripts[i], hashtype, key)?;
    }
    Ok(())
}

/// Loads a WIF-encoded key under `params` and signs a single input.
pub fn sign_input_with_wif(
    tx: &mut Transaction,
    in_num: usize,
    prev_script_hex: &str,
    hashtype: u8,
    wif: &str,
    params: &ChainParams,
) -> Result<(), TxError> {
    let key = PrivateKey::from_wif(wif, params)?;
    let prev_script = hex::decode(prev_script_hex).map_err(|_| TxError::InvalidAddress(prev_script_hex.to_string()))?;
    sign_input(tx, in_num, &prev_script, hashtype, &key)
}
