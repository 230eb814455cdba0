//! Legacy (pre-segwit) sighash computation, grounded on
//! `original_source/src/transaction.c`'s `dogecoin_tx_sighash` and Bitcoin's
//! historical `SignatureHash` rules the Dogecoin source ports verbatim.

use crate::tx::{Transaction, TxOut};
use doge_types::{double_sha256, H256};

pub const SIGHASH_ALL: u8 = 0x01;
pub const SIGHASH_NONE: u8 = 0x02;
pub const SIGHASH_SINGLE: u8 = 0x03;
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// The historical "no matching output" sentinel digest SIGHASH_SINGLE
/// returns instead of an error when `in_num >= vout.len()`: the 256-bit
/// little-endian value `1`.
fn single_bug_sentinel() -> H256 {
    let mut bytes = [0u8; 32];
    bytes[0] = 1;
    H256::from_be_bytes(bytes)
}

/// Computes the legacy sighash digest for input `in_num` signed against
/// `prev_script` (the scriptPubKey or redeem script being spent), under the
/// given hashtype byte.
///
/// Precondition: `in_num < tx.vin.len()`; callers validate this themselves
/// and surface `TxError::InputIndexOutOfRange` since that is a caller bug,
/// distinct from SIGHASH_SINGLE's "no matching output" sentinel below.
pub fn compute_sighash(tx: &Transaction, prev_script: &[u8], in_num: usize, hashtype: u8) -> H256 {
    let base_type = hashtype & 0x1f;
    if base_type == SIGHASH_SINGLE && in_num >= tx.vout.len() {
        return single_bug_sentinel();
    }

    let mut work = tx.clone();
    for txin in work.vin.iter_mut() {
        txin.script_sig.clear();
    }
    work.vin[in_num].script_sig = doge_script::copy_without_op_codeseparator(prev_script);

    match base_type {
        SIGHASH_NONE => {
            work.vout.clear();
            for (i, txin) in work.vin.iter_mut().enumerate() {
                if i != in_num {
                    txin.sequence = 0;
                }
            }
        }
        SIGHASH_SINGLE => {
            work.vout.truncate(in_num + 1);
            for out in work.vout.iter_mut().take(in_num) {
                out.value = -1;
                out.script_pubkey.clear();
            }
            for (i, txin) in work.vin.iter_mut().enumerate() {
                if i != in_num {
                    txin.sequence = 0;
                }
            }
        }
        _ => {}
    }

    if hashtype & SIGHASH_ANYONECANPAY != 0 {
        let signed_input = work.vin[in_num].clone();
        work.vin = vec![signed_input];
    }

    let mut preimage = work.serialize();
    preimage.extend_from_slice(&(hashtype as u32).to_le_bytes());
    double_sha256(&preimage)
}

/// True when `vout` reflects the SIGHASH_SINGLE "blanked" pattern applied by
/// `compute_sighash` (used only by tests to sanity-check the mutation shape).
#[allow(dead_code)]
fn is_single_blanked(vout: &[TxOut], upto: usize) -> bool {
    vout.iter().take(upto).all(|o| o.value == -1 && o.script_pubkey.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::TxIn;
    use doge_types::H256;

    fn two_input_two_output_tx() -> Transaction {
        Transaction {
            version: 1,
            vin: vec![
                TxIn { prevout_hash: H256::from_be_bytes([1u8; 32]), prevout_n: 0, script_sig: vec![], sequence: 0xFFFF_FFFF },
                TxIn { prevout_hash: H256::from_be_bytes([2u8; 32]), prevout_n: 1, script_sig: vec![], sequence: 0xFFFF_FFFF },
            ],
            vout: vec![
                TxOut { value: 100, script_pubkey: vec![0xac] },
                TxOut { value: 200, script_pubkey: vec![0xac] },
            ],
            locktime: 0,
        }
    }

    #[test]
    fn all_hashtype_is_deterministic_and_sensitive_to_script() {
        let tx = two_input_two_output_tx();
        let script_a = vec![0x76, 0xa9, 0x14];
        let script_b = vec![0x76, 0xa9, 0x15];
        let h1 = compute_sighash(&tx, &script_a, 0, SIGHASH_ALL);
        let h2 = compute_sighash(&tx, &script_a, 0, SIGHASH_ALL);
        let h3 = compute_sighash(&tx, &script_b, 0, SIGHASH_ALL);
        assert_eq!(h1, h2);
        assert_ne!(h1, h3);
    }

    #[test]
    fn single_out_of_range_returns_sentinel() {
        let mut tx = two_input_two_output_tx();
        tx.vout.truncate(1);
        let script = vec![0xac];
        let h = compute_sighash(&tx, &script, 1, SIGHASH_SINGLE);
        assert_eq!(h, super::single_bug_sentinel());
    }

    #[test]
    fn anyonecanpay_collapses_to_single_input() {
        let tx = two_input_two_output_tx();
        let script = vec![0xac];
        let with_flag = compute_sighash(&tx, &script, 1, SIGHASH_ALL | SIGHASH_ANYONECANPAY);
        let mut solo = tx.clone();
        solo.vin = vec![solo.vin[1].clone()];
        let expected = compute_sighash(&solo, &script, 0, SIGHASH_ALL | SIGHASH_ANYONECANPAY);
        assert_eq!(with_flag, expected);
    }

    #[test]
    fn none_hashtype_clears_outputs_and_other_sequences() {
        let tx = two_input_two_output_tx();
        let script = vec![0xac];
        let h_before = compute_sighash(&tx, &script, 0, SIGHASH_NONE);
        let mut tx2 = tx.clone();
        tx2.vin[1].sequence = 0; // already what NONE would force
        let h_after = compute_sighash(&tx2, &script, 0, SIGHASH_NONE);
        assert_eq!(h_before, h_after);
    }
}
