use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MsgError {
    #[error("signed-message envelope is not 65 bytes after base64 decoding")]
    WrongEnvelopeLength,

    #[error("envelope is not valid base64")]
    InvalidBase64,

    #[error("recovery header byte {0} is outside the valid 27..=42 range")]
    InvalidHeaderByte(u8),

    #[error(transparent)]
    Key(#[from] doge_keys::KeyError),

    #[error(transparent)]
    Base58(#[from] doge_types::Base58Error),
}
