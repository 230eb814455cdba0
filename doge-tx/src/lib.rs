//! Transaction model, legacy sighash and the fluent working-transaction
//! builder for the Dogecoin protocol core.

pub mod error;
pub mod sighash;
pub mod signing;
pub mod tx;
pub mod working_tx;

pub use error::TxError;
pub use sighash::{compute_sighash, SIGHASH_ALL, SIGHASH_ANYONECANPAY, SIGHASH_NONE, SIGHASH_SINGLE};
pub use signing::{sign_all_inputs, sign_input, sign_input_with_wif};
pub use tx::{Transaction, TxIn, TxOut};
pub use working_tx::WorkingTx;
