//! # Strategy Module
//!
//! Enum-based cache/database read strategies using dispatch pattern.
//!
//! ## Available Strategies
//!
//! - `CacheFirst` - Check cache, fall back to DB on miss or cache failure (default)
//! - `DbOnly` - Skip cache entirely
//! - `ReadThrough` - Always read DB, populate cache
//!
//! Cache trouble never fails a read: it is returned as a [`ReadWarning`]
//! next to the value so callers can surface degraded reads.
//!
//! ## Example
//!
//! ```rust,ignore
//! use fleet_persistence::strategy::ReadStrategy;
//!
//! let outcome = ReadStrategy::CacheFirst
//!     .read(
//!         || cache_lookup(key),
//!         || db_lookup(id),
//!         Some(|value| cache_store(key, value)),
//!     )
//!     .await?;
//! ```

pub mod read_strategy;

pub use read_strategy::{
    CacheError, DbError, ReadError, ReadOutcome, ReadSource, ReadStrategy, ReadWarning,
};
