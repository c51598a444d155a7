//! Small shared utilities: id generation and fast index maps/sets.
use std::hash::BuildHasherDefault;

use rustc_hash::FxHasher;

/// An index map keyed with the faster, non-cryptographic `FxHasher`.
pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;
/// An index set keyed with the faster, non-cryptographic `FxHasher`.
pub type FxIndexSet<K> = indexmap::IndexSet<K, BuildHasherDefault<FxHasher>>;
/// A hash map keyed with the faster, non-cryptographic `FxHasher`.
pub type FxHashMap<K, V> = std::collections::HashMap<K, V, BuildHasherDefault<FxHasher>>;

/// Monotonically increasing id generator.
#[derive(Default)]
pub struct Counter {
    value: u64,
}

impl Counter {
    /// Returns the current (last-issued) value without advancing.
    pub fn curr(&self) -> u64 {
        self.value
    }

    /// Returns the next id and advances the counter.
    pub fn increment(&mut self) -> u64 {
        let curr = self.value;
        self.value += 1;
        curr
    }
}
