//! Hash-map aliases used for keyed lookups.
//!
//! Iteration order of these maps is unspecified: anything whose iteration
//! order feeds a decision uses `BTreeMap`/`IndexMap` instead.

pub use hashbrown::hash_map::Entry;
pub use hashbrown::HashSet;

/// Hashmap using [`hashbrown::HashMap`]
pub type HashMap<K, V> = hashbrown::HashMap<K, V>;
