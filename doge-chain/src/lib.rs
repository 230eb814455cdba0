//! Block headers, Scrypt proof-of-work, difficulty retarget, AuxPoW
//! (merged-mining) acceptance and the on-disk header store for the Dogecoin
//! protocol core.

pub mod auxpow;
pub mod error;
pub mod header;
pub mod retarget;
pub mod store;

pub use auxpow::{verify_auxpow, AuxPow, Header, MERGED_MINING_HEADER};
pub use error::ChainError;
pub use header::{check_pow, scrypt_pow_hash, BlockHeader, VERSION_AUXPOW_BIT};
pub use retarget::{expected_bits, AncestorLookup, RetargetContext};
pub use store::{BlockIndex, HeaderStore};
