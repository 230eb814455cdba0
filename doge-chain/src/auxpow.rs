//! AuxPoW (merged-mining) header variant, grounded on
//! `original_source/src/block.c`'s `deserialize_dogecoin_auxpow_block` field
//! order and the acceptance checks sketched in `contract/src/dogecoin.rs::check_aux`.
//!
//! A header is naturally a sum type here rather than a single struct with an
//! optional trailing blob: `Header::Solo` carries nothing extra, `Header::Merged`
//! always carries a complete, well-formed `AuxPow`.

use crate::error::{ChainError, Result};
use crate::header::{check_pow, scrypt_pow_hash, BlockHeader};
use doge_merkle::compute_root_from_merkle_proof;
use doge_types::codec::{write_u32_le, write_varint, Reader};
use doge_types::{ChainParams, H256};
use doge_tx::Transaction;

/// The merged-mining marker a parent coinbase's scriptSig embeds just before
/// the 32-byte auxiliary chain-merkle root commitment. Not present anywhere
/// in the retrieved example pack (only its *use* is, via the external
/// `bitcoin::dogecoin::auxpow::MERGED_MINING_HEADER` import); this is the
/// well-known Namecoin/Dogecoin merged-mining magic (0xfabe "mm").
pub const MERGED_MINING_HEADER: [u8; 4] = [0xfa, 0xbe, 0x6d, 0x6d];

#[derive(Debug, Clone)]
pub struct AuxPow {
    pub parent_coinbase: Transaction,
    pub parent_block_hash: H256,
    pub coinbase_branch: Vec<H256>,
    pub coinbase_index: u32,
    pub chain_merkle_branch: Vec<H256>,
    pub chain_merkle_index: u32,
    pub parent_header: BlockHeader,
}

impl AuxPow {
    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let parent_coinbase = Transaction::deserialize_reader(r)?;
        let parent_block_hash = H256::from_be_bytes(r.read_array::<32>()?);

        let coinbase_count = r.read_varint()?;
        let mut coinbase_branch = Vec::with_capacity(coinbase_count as usize);
        for _ in 0..coinbase_count {
            coinbase_branch.push(H256::from_be_bytes(r.read_array::<32>()?));
        }
        let coinbase_index = r.read_u32_le()?;

        let chain_count = r.read_varint()?;
        let mut chain_merkle_branch = Vec::with_capacity(chain_count as usize);
        for _ in 0..chain_count {
            chain_merkle_branch.push(H256::from_be_bytes(r.read_array::<32>()?));
        }
        let chain_merkle_index = r.read_u32_le()?;

        let parent_header = BlockHeader::read(r)?;

        Ok(AuxPow {
            parent_coinbase,
            parent_block_hash,
            coinbase_branch,
            coinbase_index,
            chain_merkle_branch,
            chain_merkle_index,
            parent_header,
        })
    }

    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.parent_coinbase.serialize());
        out.extend_from_slice(&self.parent_block_hash.0);
        write_varint(out, self.coinbase_branch.len() as u64);
        for h in &self.coinbase_branch {
            out.extend_from_slice(&h.0);
        }
        write_u32_le(out, self.coinbase_index);
        write_varint(out, self.chain_merkle_branch.len() as u64);
        for h in &self.chain_merkle_branch {
            out.extend_from_slice(&h.0);
        }
        write_u32_le(out, self.chain_merkle_index);
        out.extend_from_slice(&self.parent_header.serialize());
    }
}

/// A block header, optionally carrying its AuxPoW payload.
#[derive(Debug, Clone)]
pub enum Header {
    Solo(BlockHeader),
    Merged(BlockHeader, AuxPow),
}

impl Header {
    pub fn core(&self) -> &BlockHeader {
        match self {
            Header::Solo(h) => h,
            Header::Merged(h, _) => h,
        }
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 80 {
            return Err(ChainError::RecordTruncated);
        }
        let mut r = Reader::new(bytes);
        let core = BlockHeader::read(&mut r)?;
        if core.has_auxpow() {
            let aux = AuxPow::read(&mut r)?;
            Ok(Header::Merged(core, aux))
        } else {
            Ok(Header::Solo(core))
        }
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = self.core().serialize().to_vec();
        if let Header::Merged(_, aux) = self {
            aux.write(&mut out);
        }
        out
    }
}

/// Acceptance checks for an AuxPoW-carrying header, per the four steps of
/// merged-mining validation: chain-id gating, the aux-chain merkle proof
/// rooted in the parent coinbase's scriptSig commitment, the parent-block
/// coinbase merkle proof, and the parent's own Scrypt proof-of-work checked
/// against the *child's* declared target.
pub fn verify_auxpow(header: &BlockHeader, aux: &AuxPow, params: &ChainParams) -> Result<()> {
    let full_version = header.version as u32;
    let is_legacy = full_version == 1 || full_version == 2;
    if params.auxpow_strict_chain_id && header.chain_id() != params.auxpow_chain_id && !is_legacy {
        return Err(ChainError::AuxpowFailed);
    }

    let child_hash = header.block_hash();
    let chain_root = compute_root_from_merkle_proof(
        child_hash,
        aux.chain_merkle_index as usize,
        &aux.chain_merkle_branch,
    );

    let script_sig = &aux
        .parent_coinbase
        .vin
        .first()
        .ok_or(ChainError::AuxpowFailed)?
        .script_sig;
    let commitment_offset = find_subslice(script_sig, &MERGED_MINING_HEADER).ok_or(ChainError::AuxpowFailed)?;
    let commitment_start = commitment_offset + MERGED_MINING_HEADER.len();
    let commitment_end = commitment_start + 32;
    if commitment_end > script_sig.len() || script_sig[commitment_start..commitment_end] != chain_root.0 {
        return Err(ChainError::AuxpowFailed);
    }

    let coinbase_txid = aux.parent_coinbase.txid();
    let computed_parent_root =
        compute_root_from_merkle_proof(coinbase_txid, aux.coinbase_index as usize, &aux.coinbase_branch);
    if computed_parent_root != aux.parent_header.merkle_root {
        return Err(ChainError::AuxpowFailed);
    }
    if aux.parent_block_hash != aux.parent_header.block_hash() {
        return Err(ChainError::AuxpowFailed);
    }

    let parent_pow_hash = scrypt_pow_hash(&aux.parent_header);
    check_pow(parent_pow_hash, header.bits, params.pow_limit).map_err(|_| ChainError::AuxpowFailed)?;

    Ok(())
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
