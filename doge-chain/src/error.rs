use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChainError {
    #[error("header codec error: {0}")]
    Codec(#[from] doge_types::CodecError),

    #[error("parent transaction codec error: {0}")]
    Tx(#[from] doge_tx::TxError),

    #[error("journal file magic does not match the expected A8F011C5 prelude")]
    FileMagicMismatch,

    #[error("journal file version {0} is not supported")]
    UnsupportedVersion(u32),

    #[error("journal record ended before a complete hash/height/header triple")]
    RecordTruncated,

    #[error("header fails proof-of-work against its declared target")]
    PowFailed,

    #[error("AuxPoW payload failed acceptance checks")]
    AuxpowFailed,

    #[error("header's parent chain could not be walked back to a common ancestor")]
    OrphanHeader,

    #[error("header's prev_block is not known to the store")]
    Disconnected,

    #[error("I/O error accessing the header journal: {0}")]
    Io(String),
}

impl From<std::io::Error> for ChainError {
    fn from(e: std::io::Error) -> Self {
        ChainError::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ChainError>;
