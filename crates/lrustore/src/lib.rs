//! # lrustore
//!
//! Byte-bounded LRU store meant to be embedded in a cache server or library.
//!
//! ## Architecture
//! - **Index**: AHash map from key to arena slot (O(1) lookup)
//! - **Recency list**: doubly-linked list over an arena of nodes (O(1) move and evict)
//! - **Accounting**: every entry costs `key bytes + value.len()`; adds evict
//!   from the least recently used end until the total fits `max_bytes`
//!
//! ```
//! use lrustore::LruStore;
//!
//! let mut store = LruStore::new(4);
//! store.add("a".to_string(), "1".to_string());
//! store.add("b".to_string(), "2".to_string());
//! store.get("a");
//! store.add("c".to_string(), "3".to_string()); // evicts "b"
//!
//! assert!(store.contains("a"));
//! assert!(!store.contains("b"));
//! assert_eq!(store.used_bytes(), 4);
//! ```
//!
//! The store is not thread-safe; callers sharing it across threads wrap it
//! in their own lock.

#![warn(missing_docs)]

mod config;
mod error;
mod stats;
mod store;
mod value;

pub use config::{parse_byte_size, StoreConfig};
pub use error::{Error, Result};
pub use stats::StoreStats;
pub use store::{EvictionCallback, Iter, LruStore};
pub use value::Value;
