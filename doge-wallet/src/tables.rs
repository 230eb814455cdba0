//! Opaque integer-keyed handle tables, grounded on
//! `original_source/src/utils.c`'s `hashtable`-backed registries
//! (`dogecoin_wallet_get_working_tx`, `register_hash`, `register_hdkey`)
//! which hand a caller across an FFI boundary a plain integer instead of a
//! pointer it could otherwise dangle or double-free.
//!
//! Each registry is a [`HandleTable`] keyed by a monotonically increasing
//! index: unlike the source's `HASH_COUNT(table) + 1` scheme, which reuses an
//! index once every entry with a lower one has been removed, indices here are
//! never reused for the lifetime of the table -- the invariant SPEC_FULL.md
//! 4.M calls for.

use doge_tx::WorkingTx;
use doge_types::H256;
use doge_keys::{PrivateKey, PublicKey};

/// A plain (non-HD) key pair held in the key registry: a private scalar and
/// the public key derived from it at insertion time, so callers never have to
/// re-derive it on every lookup.
#[derive(Clone)]
pub struct KeyRecord {
    pub private: PrivateKey,
    pub public: PublicKey,
}

impl KeyRecord {
    pub fn new(private: PrivateKey, compressed: bool) -> Self {
        let public = private.public_key(compressed);
        KeyRecord { private, public }
    }
}

/// A generic opaque-handle registry: `start` hands out a fresh, never-reused
/// index; `find`/`remove` look entries up by that index.
pub struct HandleTable<T> {
    next_index: i64,
    entries: std::collections::HashMap<i64, T>,
}

impl<T> Default for HandleTable<T> {
    fn default() -> Self {
        HandleTable { next_index: 1, entries: std::collections::HashMap::new() }
    }
}

impl<T> HandleTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value`, returning its freshly allocated, never-before-used
    /// index.
    pub fn start(&mut self, value: T) -> i64 {
        let index = self.next_index;
        self.next_index += 1;
        self.entries.insert(index, value);
        index
    }

    pub fn find(&self, index: i64) -> Option<&T> {
        self.entries.get(&index)
    }

    pub fn find_mut(&mut self, index: i64) -> Option<&mut T> {
        self.entries.get_mut(&index)
    }

    /// Removes and returns the entry at `index`, if present.
    pub fn remove(&mut self, index: i64) -> Option<T> {
        self.entries.remove(&index)
    }

    /// Drops every entry currently held. `next_index` keeps advancing from
    /// wherever it was -- a fresh `start()` after `remove_all()` still never
    /// collides with an index issued before the clear.
    pub fn remove_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub type WorkingTxTable = HandleTable<WorkingTx>;
pub type HashTable = HandleTable<H256>;
pub type KeyTable = HandleTable<KeyRecord>;

/// The three registries grouped as the façade hands them out together --
/// a caller driving a C-style API one opaque index at a time typically wants
/// all three alive for the duration of a session.
#[derive(Default)]
pub struct WalletTables {
    pub working_txs: WorkingTxTable,
    pub hashes: HashTable,
    pub keys: KeyTable,
}

impl WalletTables {
    pub fn new() -> Self {
        Self::default()
    }
}
