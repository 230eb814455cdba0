pub mod base58;
pub mod codec;
pub mod error;
pub mod hash;
pub mod koinu;
pub mod network;
pub mod u256;

pub use error::{Base58Error, CodecError, KoinuError};
pub use hash::{double_sha256, hash160, H256};
pub use network::{ChainParams, Network};
pub use u256::U256;
