#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Sizing policy: initial capacity, load factor and growth factor.
pub mod config;

/// Error types for the fallible table operations.
pub mod error;

pub mod hash;

pub mod hash_table;

pub use config::TableConfig;
pub use error::ConfigError;
pub use error::Error;
pub use hash::DefaultKeyHasher;
pub use hash::KeyHasher;
pub use hash_table::Entry;
pub use hash_table::HashTable;
