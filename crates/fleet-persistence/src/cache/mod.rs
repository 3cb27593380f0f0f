//! # Cache Module
//!
//! Volatile key/value layer with per-key expiration, used to accelerate
//! latest-status reads.

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_client;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;

pub use memory::InMemoryCache;
#[cfg(feature = "redis")]
pub use redis_client::{CacheClient, CacheConfig};

/// Byte-oriented cache with TTL.
///
/// `get` returns `Ok(None)` on a miss; errors mean the cache could not
/// answer at all.
#[async_trait]
pub trait StatusCache: Send + Sync {
    /// Read the raw value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;
}

/// Shared cache handle
pub type SharedCache = Arc<dyn StatusCache>;
