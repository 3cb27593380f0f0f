//! Read strategy implementations using enum dispatch.

use std::fmt::Debug;
use std::future::Future;
use std::str::FromStr;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Read strategy enum - determines cache/db access pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadStrategy {
    /// Check cache first, fall back to DB on miss
    #[default]
    CacheFirst,
    /// Only read from database, skip cache
    DbOnly,
    /// Read from DB, populate cache on success
    ReadThrough,
}

/// Where a read was answered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadSource {
    Cache,
    Database,
}

/// Non-fatal cache trouble met during a read.
#[derive(Debug)]
pub enum ReadWarning {
    /// Cache lookup failed or returned unusable data; the DB answered instead.
    CacheRead(CacheError),
    /// Writing the DB value back into the cache failed.
    CachePopulate(CacheError),
}

/// Result of a strategy read.
#[derive(Debug)]
pub struct ReadOutcome<T> {
    pub value: Option<T>,
    pub source: ReadSource,
    pub warnings: Vec<ReadWarning>,
}

impl<T> ReadOutcome<T> {
    const fn from_database(value: Option<T>) -> Self {
        Self {
            value,
            source: ReadSource::Database,
            warnings: Vec::new(),
        }
    }
}

impl ReadStrategy {
    /// Execute a read operation according to the strategy.
    ///
    /// - `cache_fn`: Async function to read from cache
    /// - `db_fn`: Async function to read from database
    /// - `populate_fn`: Optional async function to populate cache after DB read
    ///
    /// Only a database failure is an error.
    pub async fn read<T, CacheFut, DbFut, PopulateFut>(
        &self,
        cache_fn: impl FnOnce() -> CacheFut,
        db_fn: impl FnOnce() -> DbFut,
        populate_fn: Option<impl FnOnce(T) -> PopulateFut>,
    ) -> Result<ReadOutcome<T>, ReadError>
    where
        T: Clone + Debug,
        CacheFut: Future<Output = Result<Option<T>, CacheError>>,
        DbFut: Future<Output = Result<Option<T>, DbError>>,
        PopulateFut: Future<Output = Result<(), CacheError>>,
    {
        match self {
            Self::CacheFirst => {
                let mut warnings = Vec::new();

                // Try cache first
                match cache_fn().await {
                    Ok(Some(value)) => {
                        tracing::debug!("Cache hit");
                        return Ok(ReadOutcome {
                            value: Some(value),
                            source: ReadSource::Cache,
                            warnings,
                        });
                    }
                    Ok(None) => {
                        tracing::debug!("Cache miss, falling back to DB");
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Cache error, falling back to DB");
                        warnings.push(ReadWarning::CacheRead(e));
                    }
                }

                // Fall back to DB
                let mut outcome = Self::read_db_and_populate(db_fn, populate_fn).await?;
                warnings.append(&mut outcome.warnings);
                outcome.warnings = warnings;
                Ok(outcome)
            }

            Self::DbOnly => {
                let value = db_fn().await.map_err(ReadError::Database)?;
                Ok(ReadOutcome::from_database(value))
            }

            Self::ReadThrough => Self::read_db_and_populate(db_fn, populate_fn).await,
        }
    }

    async fn read_db_and_populate<T, DbFut, PopulateFut>(
        db_fn: impl FnOnce() -> DbFut,
        populate_fn: Option<impl FnOnce(T) -> PopulateFut>,
    ) -> Result<ReadOutcome<T>, ReadError>
    where
        T: Clone + Debug,
        DbFut: Future<Output = Result<Option<T>, DbError>>,
        PopulateFut: Future<Output = Result<(), CacheError>>,
    {
        let mut outcome = ReadOutcome::from_database(db_fn().await.map_err(ReadError::Database)?);

        // Populate cache on success
        if let (Some(value), Some(populate)) = (&outcome.value, populate_fn) {
            if let Err(e) = populate(value.clone()).await {
                tracing::warn!(error = %e, "Failed to populate cache");
                outcome.warnings.push(ReadWarning::CachePopulate(e));
            }
        }

        Ok(outcome)
    }
}

impl FromStr for ReadStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cache_first" | "cache-first" => Ok(Self::CacheFirst),
            "db_only" | "db-only" => Ok(Self::DbOnly),
            "read_through" | "read-through" => Ok(Self::ReadThrough),
            other => Err(format!("unknown read strategy: {other}")),
        }
    }
}

/// Cache operation error.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The cache could not be reached or refused the operation.
    #[error("Cache backend error: {0}")]
    Backend(BoxError),
    /// The cache answered with data that does not decode.
    #[error("Malformed cache entry: {0}")]
    Malformed(BoxError),
}

impl CacheError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }

    pub fn malformed(err: impl Into<BoxError>) -> Self {
        Self::Malformed(err.into())
    }
}

/// Database operation error.
#[derive(Debug, thiserror::Error)]
#[error("Database error: {0}")]
pub struct DbError(#[from] pub BoxError);

/// Read operation error.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),
}
