//! Fetch resolver: today's file, or the nearest earlier one.
//!
//! Resolution runs strictly in order:
//!
//! 1. Today's cache file, if present, is the answer.
//! 2. Otherwise today's file is downloaded with bounded retries and saved.
//! 3. If that fails and fallback is enabled, offsets `1..=fallback_days` are
//!    visited nearest first. At each offset the cache file wins over a
//!    download and the first available file ends the run.
//!
//! Each offset is visited once. A download that cannot be saved is an
//! [`Error::Persistence`] and ends the run immediately.

use bytes::Bytes;
use chrono::NaiveDate;

use crate::Error;
use crate::config::AppConfig;
use crate::naming::{Naming, ResourceLocation};
use crate::store::Store;
use crate::transport::{Reporter, SilentReporter, Transport, fetch_with_retries};

/// Where a found file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The file was already in the cache; no request was made for it.
    AlreadyCached,
    /// The file was downloaded during this run and saved to the cache.
    Downloaded,
}

/// Why no file could be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustedReason {
    /// Today's download failed and fallback is disabled.
    NoFallback,
    /// Today's download failed and every day in the fallback window was unavailable too.
    WindowExhausted { days: u32 },
}

/// Terminal result of [`Resolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found { bytes: Bytes, location: ResourceLocation, origin: Origin },
    NotFound(ExhaustedReason),
}

impl FetchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, FetchOutcome::Found { .. })
    }

    pub fn location(&self) -> Option<&ResourceLocation> {
        match self {
            FetchOutcome::Found { location, .. } => Some(location),
            FetchOutcome::NotFound(_) => None,
        }
    }

    /// Whether the file found belongs to an earlier day than requested.
    pub fn fell_back(&self) -> bool {
        self.location().is_some_and(|loc| loc.offset > 0)
    }
}

/// Resolves the dataset for a given day against a transport and a store.
pub struct Resolver<T, S> {
    naming: Naming,
    retry_limit: u32,
    fallback_days: u32,
    transport: T,
    store: S,
    reporter: Box<dyn Reporter>,
}

impl<T, S> Resolver<T, S>
where
    T: Transport,
    S: Store,
{
    pub fn new(config: &AppConfig, transport: T, store: S) -> Self {
        Self {
            naming: Naming::from_config(config),
            retry_limit: config.retry_limit,
            fallback_days: config.fallback_days,
            transport,
            store,
            reporter: Box::new(SilentReporter),
        }
    }

    /// Send progress notifications to `reporter`.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Box::new(reporter);
        self
    }

    /// Obtain the file for `today`, falling back to earlier days if configured.
    ///
    /// # Errors
    ///
    /// Returns `Error::Persistence` if a downloaded file cannot be saved and
    /// `Error::CacheRead` if a cached file cannot be read back. Failed
    /// downloads are not errors; they end in `FetchOutcome::NotFound`.
    pub async fn resolve(&self, today: NaiveDate) -> Result<FetchOutcome, Error> {
        let location = self.naming.location_for(today, None);
        if let Some(found) = self.obtain(location).await? {
            return Ok(found);
        }

        if self.fallback_days == 0 {
            tracing::warn!("download for {} failed and no fallback is configured", today);
            return Ok(FetchOutcome::NotFound(ExhaustedReason::NoFallback));
        }

        for offset in 1..=self.fallback_days {
            let location = self.naming.location_for(today, Some(offset));
            let date = location.date;
            if let Some(found) = self.obtain(location).await? {
                tracing::info!("fell back {} day(s) to {}", offset, date);
                return Ok(found);
            }
        }

        tracing::warn!("no file found for {} or the {} day(s) before it", today, self.fallback_days);
        Ok(FetchOutcome::NotFound(ExhaustedReason::WindowExhausted { days: self.fallback_days }))
    }

    /// Cache first, then download. `None` when the day is unavailable.
    async fn obtain(&self, location: ResourceLocation) -> Result<Option<FetchOutcome>, Error> {
        if self.store.exists(&location.local_path).await {
            tracing::debug!("cache hit for {}", location.local_path.display());
            let bytes = self
                .store
                .read_all(&location.local_path)
                .await
                .map_err(|source| Error::CacheRead { path: location.local_path.clone(), source })?;
            return Ok(Some(FetchOutcome::Found { bytes, location, origin: Origin::AlreadyCached }));
        }

        let bytes =
            match fetch_with_retries(&self.transport, &location.remote_url, self.retry_limit, self.reporter.as_ref())
                .await
            {
                Ok(bytes) => bytes,
                Err(exhausted) => {
                    tracing::info!("{}", exhausted);
                    return Ok(None);
                }
            };

        self.reporter.saving(&location.local_path);
        self.store
            .write_all(&location.local_path, &bytes)
            .await
            .map_err(|source| Error::Persistence { path: location.local_path.clone(), source })?;
        self.reporter.saved(&location.local_path);

        tracing::info!("downloaded {} to {}", location.remote_url, location.local_path.display());
        Ok(Some(FetchOutcome::Found { bytes, location, origin: Origin::Downloaded }))
    }
}
