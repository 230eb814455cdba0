use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// A 32-byte hash, stored internally in the byte order the protocol serializes
/// it in (little-endian, the same convention the reference client uses for
/// txids and block hashes). Display/hex (de)serialization reverses the bytes,
/// matching how these hashes are conventionally printed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct H256(pub [u8; 32]);

impl H256 {
    pub const ZERO: H256 = H256([0u8; 32]);

    pub fn from_be_bytes(b: [u8; 32]) -> Self {
        H256(b)
    }

    pub fn to_hex(&self) -> String {
        let mut reversed = self.0;
        reversed.reverse();
        hex::encode(reversed)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        bytes.reverse();
        Ok(H256(bytes))
    }
}

impl fmt::Debug for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H256({})", self.to_hex())
    }
}

impl fmt::Display for H256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

struct HexVisitor;

impl<'de> Visitor<'de> for HexVisitor {
    type Value = H256;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a 64-character hex string")
    }

    fn visit_str<E>(self, value: &str) -> Result<H256, E>
    where
        E: de::Error,
    {
        H256::from_hex(value).map_err(de::Error::custom)
    }
}

impl Serialize for H256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for H256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<H256, D::Error> {
        deserializer.deserialize_str(HexVisitor)
    }
}

/// Double SHA-256, the hash used throughout the protocol for txids and block hashes.
pub fn double_sha256(data: &[u8]) -> H256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    H256(out)
}

/// RIPEMD-160(SHA-256(data)), the digest used to identify keys and scripts.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    use ripemd::Ripemd160;
    let sha = Sha256::digest(data);
    let rmd = Ripemd160::digest(sha);
    let mut out = [0u8; 20];
    out.copy_from_slice(&rmd);
    out
}
