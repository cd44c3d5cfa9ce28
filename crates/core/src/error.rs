//! Unified error types for dayfetch.
//!
//! Only failures that end a run live here. Failed download attempts are
//! [`AttemptFailure`](crate::transport::AttemptFailure) values and never
//! escape the retry loop.

use std::io;
use std::path::PathBuf;

/// Unified error type for the fetch resolver.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Bytes were downloaded but could not be written to the cache.
    /// Never reported as an exhausted outcome.
    #[error("PERSISTENCE_FAILED: {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A cache file exists but could not be read back.
    #[error("CACHE_READ_FAILED: {}: {source}", .path.display())]
    CacheRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The HTTP client could not be built.
    #[error("CLIENT_INIT_FAILED: {0}")]
    ClientInit(String),
}

impl Error {
    /// Whether downloaded data was lost because it could not be saved.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Error::Persistence { .. })
    }
}
