use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum KeyError {
    #[error("scalar is out of range for the secp256k1 group order")]
    InvalidKey,

    #[error("WIF prefix byte {0:#x} does not match the expected chain prefix {1:#x}")]
    WrongWifVersion(u8, u8),

    #[error("WIF payload has the wrong length")]
    WrongWifLength,

    #[error("public key is not a valid curve point")]
    InvalidPublicKey,

    #[error(transparent)]
    Base58(#[from] doge_types::Base58Error),

    #[error("signature could not be recovered from the given recovery id")]
    RecoveryFailed,

    #[error("signing failed after exhausting the bounded nonce-retry budget")]
    SignFailed,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum HdError {
    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Base58(#[from] doge_types::Base58Error),

    #[error("extended key payload is not 78 bytes")]
    WrongLength,

    #[error("extended key version prefix {0:#010x} is not recognised for this chain")]
    UnknownVersion(u32),

    #[error("private-tagged extended key must have a leading zero byte before the key material")]
    MissingPrivateTag,

    #[error("cannot derive a hardened child from a public-only node")]
    HardenedFromPublic,

    #[error("derivation path must start with 'm'")]
    PathMustStartWithM,

    #[error("derivation path segment '{0}' is not a valid index")]
    BadPathSegment(String),

    #[error("child key derivation produced an invalid key; caller must retry with index+1")]
    DerivationFailed,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MnemonicError {
    #[error("entropy size {0} bits is not one of the supported sizes")]
    UnsupportedEntropySize(usize),

    #[error("word '{0}' is not present in the wordlist")]
    UnknownWord(String),

    #[error("mnemonic checksum does not match its entropy")]
    BadChecksum,

    #[error("mnemonic word count {0} is not a multiple of 3 in [12, 24]")]
    WrongWordCount(usize),
}
