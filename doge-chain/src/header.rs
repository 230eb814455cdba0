//! 80-byte block header model, double-SHA256 identity hash and the Scrypt
//! proof-of-work hash, grounded on `original_source/src/block.c`'s
//! `dogecoin_block_header_serialize`/`_hash` field order and the manual
//! little-endian style already used by `doge-tx`'s transaction codec.

use crate::error::{ChainError, Result};
use doge_types::codec::{write_i32_le, write_u32_le, Reader};
use doge_types::{double_sha256, H256, U256};
use scrypt::{scrypt, Params};

/// Version bit that marks a header as carrying a trailing AuxPoW blob.
pub const VERSION_AUXPOW_BIT: u32 = 0x100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block: H256,
    pub merkle_root: H256,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    pub fn has_auxpow(&self) -> bool {
        (self.version as u32) & VERSION_AUXPOW_BIT != 0
    }

    /// The chain-id merged-mining identifies this header with, the upper 16
    /// bits of the version field.
    pub fn chain_id(&self) -> u16 {
        ((self.version as u32) >> 16) as u16
    }

    pub fn serialize(&self) -> [u8; 80] {
        let mut out = Vec::with_capacity(80);
        write_i32_le(&mut out, self.version);
        out.extend_from_slice(&self.prev_block.0);
        out.extend_from_slice(&self.merkle_root.0);
        write_u32_le(&mut out, self.timestamp);
        write_u32_le(&mut out, self.bits);
        write_u32_le(&mut out, self.nonce);
        out.try_into().expect("six fixed-width fields sum to exactly 80 bytes")
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        BlockHeader::read(&mut r)
    }

    pub(crate) fn read(r: &mut Reader) -> Result<Self> {
        let version = r.read_i32_le()?;
        let prev_block = H256::from_be_bytes(r.read_array::<32>()?);
        let merkle_root = H256::from_be_bytes(r.read_array::<32>()?);
        let timestamp = r.read_u32_le()?;
        let bits = r.read_u32_le()?;
        let nonce = r.read_u32_le()?;
        Ok(BlockHeader { version, prev_block, merkle_root, timestamp, bits, nonce })
    }

    /// Double-SHA256 of the canonical 80-byte serialization; the header's
    /// identity and the value linked to by a child's `prev_block`.
    pub fn block_hash(&self) -> H256 {
        double_sha256(&self.serialize())
    }
}

/// Scrypt(N=1024, r=1, p=1, dkLen=32) over the 80-byte header, used as both
/// password and salt (the Litecoin/Dogecoin merged-mining convention).
pub fn scrypt_pow_hash(header: &BlockHeader) -> H256 {
    let bytes = header.serialize();
    let params = Params::new(10, 1, 1, 32).expect("N=1024,r=1,p=1,dkLen=32 are valid scrypt params");
    let mut out = [0u8; 32];
    scrypt(&bytes, &bytes, &params, &mut out).expect("32-byte output is within scrypt's limits");
    H256(out)
}

/// Checks a Scrypt PoW hash against a compact target, rejecting negative,
/// overflowing, zero, or above-`pow_limit` targets along the way.
pub fn check_pow(hash: H256, bits: u32, pow_limit: U256) -> Result<U256> {
    let (target, negative, overflow) = U256::set_compact(bits);
    if negative || overflow || target.is_zero() || target > pow_limit {
        return Err(ChainError::PowFailed);
    }
    let hash_value = U256::from_le_bytes(&hash.0);
    if hash_value > target {
        return Err(ChainError::PowFailed);
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BlockHeader {
        BlockHeader {
            version: 1,
            prev_block: H256::ZERO,
            merkle_root: H256([0x11; 32]),
            timestamp: 1_386_474_927,
            bits: 0x1e0f_ffff,
            nonce: 99_943,
        }
    }

    #[test]
    fn serialize_deserialize_round_trips() {
        let header = sample();
        let bytes = header.serialize();
        assert_eq!(bytes.len(), 80);
        let back = BlockHeader::deserialize(&bytes).unwrap();
        assert_eq!(back, header);
    }

    #[test]
    fn auxpow_bit_detection() {
        let mut header = sample();
        assert!(!header.has_auxpow());
        header.version = 1 | (VERSION_AUXPOW_BIT as i32);
        assert!(header.has_auxpow());
    }

    #[test]
    fn check_pow_rejects_target_above_pow_limit() {
        let header = sample();
        let hash = scrypt_pow_hash(&header);
        // a pow_limit of zero can never be met.
        let err = check_pow(hash, header.bits, U256::ZERO).unwrap_err();
        assert!(matches!(err, ChainError::PowFailed));
    }

    #[test]
    fn check_pow_accepts_when_hash_is_within_a_generous_target() {
        let header = sample();
        let hash = scrypt_pow_hash(&header);
        let target = U256::from_le_bytes(&hash.0);
        // the hash is always <= itself; pow_limit wide open at U256::MAX.
        let (_, negative, overflow) = U256::set_compact(target.target_to_bits());
        assert!(!negative && !overflow);
        assert!(check_pow(hash, target.target_to_bits(), U256::MAX).is_ok());
    }
}
