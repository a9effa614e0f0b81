//! Carton - The artist's toolbox for Sgraffito.
//!
//! This crate provides the small set of shared utilities the other Sgraffito
//! crates lean on, much like a carton (artist's portfolio case) holds the
//! tools an artist carries between sittings.
//!
//! # Modules
//!
//! - **Memo**: append-only, concurrently shared memoization caches
//! - **Re-exports**: fast hash collections and compact strings
//!
//! # Example
//!
//! ```
//! use sgraffito_carton::MemoCache;
//!
//! let cache: MemoCache<&str, usize> = MemoCache::new();
//! assert_eq!(cache.get_or_insert_with("scss", || 4), 4);
//! // Second lookup never runs the initializer.
//! assert_eq!(cache.get_or_insert_with("scss", || unreachable!()), 4);
//! ```

pub mod memo;

pub use memo::MemoCache;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
