//! Rate Cache
//!
//! Decides when the stored rate is stale, refreshes it through the
//! `RateSource` port and writes the result through the `RateStore` port.
//!
//! At most one refresh is in flight at any time. Callers that find the rate
//! stale while a refresh is running wait for it and receive its outcome
//! (value or error) instead of issuing their own upstream call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use rates_types::{RateError, RateObservation, RateSource, RateStore, SourceError};

/// Default maximum age of a stored observation.
pub const DEFAULT_STALENESS_THRESHOLD: Duration = Duration::from_secs(24 * 60 * 60);

/// Default upper bound on one upstream fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Tuning knobs for [`RateCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCacheConfig {
    /// Observations older than this trigger a refresh.
    pub staleness_threshold: Duration,
    /// A fetch that takes longer fails with `UpstreamUnavailable`.
    pub fetch_timeout: Duration,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            staleness_threshold: DEFAULT_STALENESS_THRESHOLD,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

/// Outcome of the most recent refresh, kept for callers that queued behind it.
#[derive(Default)]
struct RefreshSlot {
    generation: u64,
    last: Option<Result<RateObservation, RateError>>,
}

/// Read-through cache over the rate log with single-flight refreshes.
pub struct RateCache<R: RateStore, S: RateSource> {
    store: Arc<R>,
    source: S,
    config: RateCacheConfig,
    slot: Mutex<RefreshSlot>,
    /// Mirror of `slot.generation`, readable without taking the lock.
    completed: AtomicU64,
}

impl<R: RateStore, S: RateSource> RateCache<R, S> {
    pub fn new(store: Arc<R>, source: S, config: RateCacheConfig) -> Self {
        Self {
            store,
            source,
            config,
            slot: Mutex::new(RefreshSlot::default()),
            completed: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &RateCacheConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Returns the latest rate, refreshing it first if missing or stale.
    ///
    /// A refresh failure is returned as an error; a stale value is never
    /// handed back in its place.
    #[instrument(skip(self))]
    pub async fn get_current(&self) -> Result<RateObservation, RateError> {
        // Read before the store so a refresh finishing after this point is joinable.
        let seen = self.completed.load(Ordering::Acquire);

        match self.store.latest().await? {
            Some(latest) if !latest.is_stale(Utc::now(), self.config.staleness_threshold) => {
                debug!(value = latest.value(), "Serving stored rate");
                return Ok(latest);
            }
            Some(latest) => debug!(age = %latest.age(Utc::now()), "Stored rate is stale"),
            None => debug!("No stored rate"),
        }

        self.refresh_after(seen).await
    }

    /// Fetches and stores a new rate regardless of staleness.
    ///
    /// If a refresh is already running, its outcome is returned instead of
    /// starting a second one.
    #[instrument(skip(self))]
    pub async fn force_refresh(&self) -> Result<RateObservation, RateError> {
        let seen = self.completed.load(Ordering::Acquire);
        self.refresh_after(seen).await
    }

    /// Runs a refresh unless one completed after generation `seen`.
    async fn refresh_after(&self, seen: u64) -> Result<RateObservation, RateError> {
        let mut slot = self.slot.lock().await;

        if slot.generation > seen {
            if let Some(outcome) = &slot.last {
                debug!(generation = slot.generation, "Joined in-flight refresh");
                return outcome.clone();
            }
        }

        let outcome = self.fetch_and_append().await;

        slot.generation += 1;
        slot.last = Some(outcome.clone());
        self.completed.store(slot.generation, Ordering::Release);

        outcome
    }

    async fn fetch_and_append(&self) -> Result<RateObservation, RateError> {
        let timeout = self.config.fetch_timeout;
        let fetched = match tokio::time::timeout(timeout, self.source.fetch()).await {
            Ok(Ok(observation)) => observation,
            Ok(Err(e)) => {
                warn!(error = %e, "Rate refresh failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(?timeout, "Rate refresh timed out");
                return Err(SourceError::UpstreamUnavailable(format!(
                    "no response within {timeout:?}"
                ))
                .into());
            }
        };

        self.store.append(fetched).await.inspect_err(|e| {
            warn!(error = %e, "Cannot persist refreshed rate");
        })?;

        info!(
            value = fetched.value(),
            date = %fetched.effective_date(),
            "Rate refreshed"
        );
        Ok(fetched)
    }
}
