//! Carton - The artist's toolbox for Vellum.
//!
//! This crate provides the foundational utilities shared by every Vellum crate,
//! much like a carton (artist's portfolio case) holds the essential tools and
//! materials an artist needs before any drawing starts.
//!
//! # Modules
//!
//! - **case**: camelCase to dash-case conversion for attribute and event names
//! - **hash**: content hashing used as document versions
//! - **line_index**: byte offset to line/column mapping
//!
//! # Example
//!
//! ```
//! use vellum_carton::{hyphenate, LineIndex};
//!
//! assert_eq!(hyphenate("fooBar"), "foo-bar");
//!
//! let index = LineIndex::new("a\nbc");
//! assert_eq!(index.line_col(3), (1, 1));
//! ```

pub mod case;
pub mod hash;
pub mod line_index;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_map, phf_set, Map as PhfMap, Set as PhfSet};

/// Insertion-ordered map with the fast Fx hasher.
pub type FxIndexMap<K, V> = indexmap::IndexMap<K, V, FxBuildHasher>;

// Re-export shared utilities
pub use case::*;
pub use hash::*;
pub use line_index::LineIndex;
