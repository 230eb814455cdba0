//! Key primitives, BIP32 HD keys and BIP39 mnemonics for the Dogecoin
//! protocol core.

pub mod error;
pub mod hd;
pub mod keys;
pub mod mnemonic;

pub use error::{HdError, KeyError, MnemonicError};
pub use hd::{bip44_path, parse_path, ExtendedKey, KeyMaterial, NodeMeta};
pub use keys::{recover_public_key, verify_der, PrivateKey, PublicKey};
