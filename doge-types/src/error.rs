use thiserror::Error;

/// Errors raised while encoding or decoding the wire-level byte formats.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CodecError {
    #[error("unexpected end of input while reading {0}")]
    Truncated(&'static str),

    #[error("varint is not minimally encoded")]
    NonMinimalVarint,

    #[error("length prefix {0} exceeds the configured maximum {1}")]
    LengthOverflow(u64, u64),
}

/// Errors raised while decoding a base58check payload.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Base58Error {
    #[error("byte {0} is not a valid base58 digit")]
    MalformedDigit(char),

    #[error("decoded payload length {0} exceeds the configured maximum")]
    LengthOverflow(usize),

    #[error("checksum mismatch")]
    BadChecksum,

    #[error("leading zero byte count does not match leading '1' character count")]
    LeadingZeroMismatch,

    #[error("payload is shorter than the 4-byte checksum")]
    PrefixTooShort,
}

/// Errors raised while converting between a coin-decimal string and koinu.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum KoinuError {
    #[error("input is not a decimal number")]
    NonDecimal,

    #[error("trailing characters after the decimal value")]
    InvalidTermination,

    #[error("value is out of range for a u64 koinu amount")]
    OutOfRange,

    #[error("value overflows u64 koinu representation")]
    Overflow,

    #[error("negative amount cannot be represented as unsigned koinu")]
    Underflow,
}
