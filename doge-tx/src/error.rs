use doge_types::{Base58Error, CodecError, KoinuError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TxError {
    #[error("transaction codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("address codec error: {0}")]
    Base58(#[from] Base58Error),

    #[error("koinu amount error: {0}")]
    Koinu(#[from] KoinuError),

    #[error("key error: {0}")]
    Key(#[from] doge_keys::KeyError),

    #[error("input index {0} out of range (tx has {1} inputs)")]
    InputIndexOutOfRange(usize, usize),

    #[error("destination address {0:?} is not a valid base58check address")]
    InvalidAddress(String),

    #[error("output total exceeds declared input total; residual change would be negative")]
    AmountImbalance,

    #[error("per-input amount array length {0} does not match input count {1}")]
    AmountArityMismatch(usize, usize),
}
