use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ScriptError {
    #[error("script ended in the middle of a push-data instruction")]
    Truncated,

    #[error("multisig requires 1 <= m <= n <= 16 pubkeys, got m={0} n={1}")]
    InvalidMultisigParams(u8, usize),
}
