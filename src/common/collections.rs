//! Hashers used throughout the crate. The keys are small (app ids, trigger
//! ids, workspace indices), so FxHash beats SipHash without any DoS concern.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;
