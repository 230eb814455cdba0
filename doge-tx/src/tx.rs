//! Transaction data model and canonical (legacy, non-witness) serialization,
//! grounded on `btc-types/src/btc_header.rs`'s manual little-endian
//! encode/decode style and `original_source/src/tx.c`'s `dogecoin_tx_serialize`
//! field order.

use crate::error::TxError;
use doge_types::codec::{write_i64_le, write_i32_le, write_u32_le, write_varbytes, write_varint, Reader};
use doge_types::{double_sha256, H256};

const MAX_SCRIPT_LEN: u64 = 10_000_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub prevout_hash: H256,
    pub prevout_n: u32,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    pub fn is_coinbase_prevout(&self) -> bool {
        self.prevout_hash == H256::ZERO && self.prevout_n == 0xFFFF_FFFF
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub value: i64,
    pub script_pubkey: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub vin: Vec<TxIn>,
    pub vout: Vec<TxOut>,
    pub locktime: u32,
}

impl Transaction {
    pub fn new() -> Self {
        Transaction { version: 1, vin: Vec::new(), vout: Vec::new(), locktime: 0 }
    }

    /// A transaction is coinbase iff it has exactly one input whose prevout
    /// is the all-zero hash at index `0xFFFFFFFF`.
    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].is_coinbase_prevout()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(128);
        write_i32_le(&mut out, self.version);
        write_varint(&mut out, self.vin.len() as u64);
        for txin in &self.vin {
            out.extend_from_slice(&txin.prevout_hash.0);
            write_u32_le(&mut out, txin.prevout_n);
            write_varbytes(&mut out, &txin.script_sig);
            write_u32_le(&mut out, txin.sequence);
        }
        write_varint(&mut out, self.vout.len() as u64);
        for txout in &self.vout {
            write_i64_le(&mut out, txout.value);
            write_varbytes(&mut out, &txout.script_pubkey);
        }
        write_u32_le(&mut out, self.locktime);
        out
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, TxError> {
        let mut r = Reader::new(bytes);
        Transaction::deserialize_reader(&mut r)
    }

    /// Parses a transaction starting at the reader's current position,
    /// leaving the cursor just past the locktime. Lets a transaction be
    /// embedded inside a larger structure (e.g. an AuxPoW parent coinbase)
    /// without either side needing to know the other's length up front.
    pub fn deserialize_reader(r: &mut Reader) -> Result<Self, TxError> {
        let version = r.read_i32_le()?;
        let vin_len = r.read_varint()?;
        let mut vin = Vec::with_capacity(vin_len as usize);
        for _ in 0..vin_len {
            let prevout_hash = H256::from_be_bytes(r.read_array::<32>()?);
            let prevout_n = r.read_u32_le()?;
            let script_sig = r.read_varbytes(MAX_SCRIPT_LEN)?;
            let sequence = r.read_u32_le()?;
            vin.push(TxIn { prevout_hash, prevout_n, script_sig, sequence });
        }
        let vout_len = r.read_varint()?;
        let mut vout = Vec::with_capacity(vout_len as usize);
        for _ in 0..vout_len {
            let value = r.read_i64_le()?;
            let script_pubkey = r.read_varbytes(MAX_SCRIPT_LEN)?;
            vout.push(TxOut { value, script_pubkey });
        }
        let locktime = r.read_u32_le()?;
        Ok(Transaction { version, vin, vout, locktime })
    }

    /// Double-SHA256 of the legacy serialization, the transaction's identity.
    pub fn txid(&self) -> H256 {
        double_sha256(&self.serialize())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.serialize())
    }

    pub fn from_hex(s: &str) -> Result<Self, TxError> {
        let bytes = hex::decode(s).map_err(|_| TxError::InvalidAddress(s.to_string()))?;
        Transaction::deserialize(&bytes)
    }
}

impl Default for Transaction {
    fn default() -> Self {
        Transaction::new()
    }
}
