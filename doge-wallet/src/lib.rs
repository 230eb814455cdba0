//! Address façade, opaque handle tables and the aggregating crate-level
//! error type for the Dogecoin protocol core. This crate is the top of the
//! workspace: it depends on every other `doge-*` crate and composes them
//! into the single-call operations a wallet application actually makes.

pub mod error;
pub mod facade;
pub mod tables;

pub use error::DogeError;
pub use facade::{derive_from_xpriv, gen_from_mnemonic, gen_hd_master, gen_priv_pub, verify_p2pkh, verify_priv_pub};
pub use tables::{HandleTable, HashTable, KeyRecord, KeyTable, WalletTables, WorkingTxTable};
