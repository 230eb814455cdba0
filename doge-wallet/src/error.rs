//! Crate-level error aggregation. Every lower crate in the workspace owns its
//! own `thiserror`-derived enum scoped to the concern it implements; this
//! type exists only at the façade, where a caller juggling keys, addresses,
//! transactions and chain state in the same call wants one `Result` to
//! match on.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DogeError {
    #[error(transparent)]
    Codec(#[from] doge_types::CodecError),

    #[error(transparent)]
    Base58(#[from] doge_types::Base58Error),

    #[error(transparent)]
    Koinu(#[from] doge_types::KoinuError),

    #[error(transparent)]
    Key(#[from] doge_keys::KeyError),

    #[error(transparent)]
    Hd(#[from] doge_keys::HdError),

    #[error(transparent)]
    Mnemonic(#[from] doge_keys::MnemonicError),

    #[error(transparent)]
    Script(#[from] doge_script::ScriptError),

    #[error(transparent)]
    Tx(#[from] doge_tx::TxError),

    #[error(transparent)]
    Chain(#[from] doge_chain::ChainError),

    #[error(transparent)]
    Msg(#[from] doge_msg::MsgError),

    #[error("address {0:?} does not resolve to a recognised chain")]
    UnrecognisedAddress(String),

    #[error("extended key prefix does not resolve to a recognised chain")]
    UnrecognisedExtendedKeyVersion,

    #[error("handle {0} is not present in this table")]
    UnknownHandle(i64),
}
