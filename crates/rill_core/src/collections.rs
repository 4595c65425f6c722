//! Hash collection aliases used throughout the interpreter.
//!
//! Symbol-keyed maps hash pointers and short names, so the Fx hasher is used
//! everywhere instead of SipHash.

use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

pub use rustc_hash::{FxHashMap, FxHashSet};

/// An insertion-ordered map using the Fx hasher.
pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// An insertion-ordered set using the Fx hasher.
pub type FxIndexSet<T> = indexmap::IndexSet<T, BuildHasherDefault<FxHasher>>;
