//! The fluent "working transaction" builder, grounded on
//! `original_source/src/transaction.c`'s `new_transaction`/`add_utxo`/
//! `add_output`/`finalize_transaction` family, re-architected per
//! SPEC_FULL.md's design note as a value-typed builder: the integer-indexed
//! handle-table variant belongs one layer up, at the façade.

use crate::error::TxError;
use crate::sighash::SIGHASH_ALL;
use crate::signing::{sign_all_inputs, sign_input};
use crate::tx::{Transaction, TxIn, TxOut};
use doge_types::{koinu::koinu_from_coin_str, ChainParams, H256};
use doge_keys::PrivateKey;

/// Builds a P2PKH or P2SH output script for `address` under `params`,
/// selecting the template from the address's base58check version byte.
fn output_script_for_address(address: &str, params: &ChainParams) -> Result<Vec<u8>, TxError> {
    let payload = doge_types::base58::decode_check(address).map_err(|_| TxError::InvalidAddress(address.to_string()))?;
    if payload.len() != 21 {
        return Err(TxError::InvalidAddress(address.to_string()));
    }
    let version = payload[0];
    let mut hash160 = [0u8; 20];
    hash160.copy_from_slice(&payload[1..]);

    if version == params.p2pkh_version {
        Ok(doge_script::build_p2pkh(&hash160))
    } else if version == params.p2sh_version {
        Ok(doge_script::build_p2sh(&hash160))
    } else {
        Err(TxError::InvalidAddress(address.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkingTx {
    tx: Transaction,
}

impl WorkingTx {
    pub fn new() -> Self {
        WorkingTx { tx: Transaction::new() }
    }

    /// Appends an input spending `vout_n` of `prev_txid_hex` (display-order
    /// hex, as returned by `Transaction::txid().to_hex()`), with an empty
    /// scriptSig and maximal sequence.
    pub fn add_utxo(&mut self, prev_txid_hex: &str, vout_n: u32) -> Result<(), TxError> {
        let prevout_hash = H256::from_hex(prev_txid_hex).map_err(|_| TxError::InvalidAddress(prev_txid_hex.to_string()))?;
        self.tx.vin.push(TxIn {
            prevout_hash,
            prevout_n: vout_n,
            script_sig: Vec::new(),
            sequence: 0xFFFF_FFFF,
        });
        Ok(())
    }

    /// Appends a P2PKH/P2SH output paying `coin_decimal` (e.g. `"5.0"`) to
    /// `address`, selecting the template from the address's version byte.
    pub fn add_output(&mut self, address: &str, coin_decimal: &str, params: &ChainParams) -> Result<(), TxError> {
        let script_pubkey = output_script_for_address(address, params)?;
        let value = koinu_from_coin_str(coin_decimal)? as i64;
        self.tx.vout.push(TxOut { value, script_pubkey });
        Ok(())
    }

    /// Verifies that `total_coin_expected` (the sum of the spent UTXOs' coin
    /// value, supplied by the caller since the builder has no UTXO lookup)
    /// minus `fee_coin` minus the outputs already added equals the residual
    /// change, appends that change output to `change_addr`, and returns the
    /// serialised transaction as hex.
    pub fn finalize(
        mut self,
        dest_addr: &str,
        fee_coin: &str,
        total_coin_expected: &str,
        change_addr: &str,
        params: &ChainParams,
    ) -> Result<String, TxError> {
        // Validated for its own sake: a malformed destination address means
        // the caller built this working tx against the wrong chain/typo'd
        // address, independent of the arithmetic below.
        let _ = doge_types::base58::decode_check(dest_addr).map_err(|_| TxError::InvalidAddress(dest_addr.to_string()))?;

        let fee = koinu_from_coin_str(fee_coin)?;
        let total_expected = koinu_from_coin_str(total_coin_expected)?;

        let outputs_total: u64 = self.tx.vout.iter().map(|o| o.value as u64).sum();
        let remaining = total_expected.checked_sub(outputs_total).ok_or(TxError::AmountImbalance)?;
        let change_value = remaining.checked_sub(fee).ok_or(TxError::AmountImbalance)?;

        let change_script = output_script_for_address(change_addr, params)?;
        self.tx.vout.push(TxOut { value: change_value as i64, script_pubkey: change_script });

        Ok(self.tx.to_hex())
    }

    /// Signs input `input_index` against `prev_script` under `hashtype`
    /// (defaulting callers typically pass `SIGHASH_ALL`) with `wif`'s key.
    pub fn sign_input(
        &mut self,
        input_index: usize,
        prev_script_hex: &str,
        hashtype: u8,
        wif: &str,
        params: &ChainParams,
    ) -> Result<(), TxError> {
        let key = PrivateKey::from_wif(wif, params)?;
        let prev_script = hex::decode(prev_script_hex).map_err(|_| TxError::InvalidAddress(prev_script_hex.to_string()))?;
        sign_input(&mut self.tx, input_index, &prev_script, hashtype, &key)
    }

    /// Signs every input, one prevout script per input, all under the same
    /// hashtype and key.
    pub fn sign_all_inputs(
        &mut self,
        prev_scripts_hex: &[String],
        hashtype: u8,
        wif: &str,
        params: &ChainParams,
    ) -> Result<(), TxError> {
        let key = PrivateKey::from_wif(wif, params)?;
        let prev_scripts: Result<Vec<Vec<u8>>, TxError> = prev_scripts_hex
            .iter()
            .map(|s| hex::decode(s).map_err(|_| TxError::InvalidAddress(s.clone())))
            .collect();
        sign_all_inputs(&mut self.tx, &prev_scripts?, hashtype, &key)
    }

    pub fn into_tx(self) -> Transaction {
        self.tx
    }

    pub fn tx(&self) -> &Transaction {
        &self.tx
    }
}

pub const DEFAULT_HASHTYPE: u8 = SIGHASH_ALL;
