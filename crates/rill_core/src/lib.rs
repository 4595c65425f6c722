//! rill_core: Core utilities shared by every rill crate.
//!
//! Provides text spans and the hash collections used throughout the
//! interpreter pipeline.

pub mod collections;
pub mod text;

pub use collections::{FxHashMap, FxHashSet, FxIndexMap, FxIndexSet};
pub use text::TextSpan;
