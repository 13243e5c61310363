//! Exchange Application Service
//!
//! Wires the rate cache, subscription store and notifier together and
//! translates their errors into `AppError` for the HTTP adapter.
//! Contains NO infrastructure logic - pure orchestration.

use std::sync::Arc;

use tracing::instrument;

use rates_types::{
    AppError, Mailer, RateObservation, RateSource, Repository, Subscriber, SubscriberEmail,
};

use crate::cache::{RateCache, RateCacheConfig};
use crate::notifier::{BroadcastReport, Notifier};

/// Application service for rate and subscription operations.
///
/// Generic over the adapters so that tests can inject in-memory doubles:
/// - `R: Repository` - rate log and subscription storage
/// - `S: RateSource` - upstream exchange-rate provider
/// - `M: Mailer` - outbound mail transport
pub struct ExchangeService<R: Repository, S: RateSource, M: Mailer> {
    repo: Arc<R>,
    cache: Arc<RateCache<R, S>>,
    notifier: Arc<Notifier<R, S, M>>,
}

impl<R: Repository, S: RateSource, M: Mailer> ExchangeService<R, S, M> {
    /// Creates the service, taking ownership of every adapter.
    pub fn new(repo: R, source: S, mailer: M, config: RateCacheConfig) -> Self {
        let repo = Arc::new(repo);
        let cache = Arc::new(RateCache::new(repo.clone(), source, config));
        let notifier = Arc::new(Notifier::new(cache.clone(), repo.clone(), mailer));
        Self {
            repo,
            cache,
            notifier,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn cache(&self) -> &Arc<RateCache<R, S>> {
        &self.cache
    }

    /// Shared handle for the background scheduler.
    pub fn notifier(&self) -> Arc<Notifier<R, S, M>> {
        self.notifier.clone()
    }

    /// Current rate, refreshed if stale. Any failure is a bad request.
    pub async fn current_rate(&self) -> Result<RateObservation, AppError> {
        self.cache.get_current().await.map_err(Into::into)
    }

    /// Subscribes an email address.
    #[instrument(skip(self))]
    pub async fn subscribe(&self, raw_email: &str) -> Result<Subscriber, AppError> {
        let email = SubscriberEmail::parse(raw_email)?;
        self.repo.try_subscribe(&email).await.map_err(Into::into)
    }

    /// Refreshes the rate and emails it to every subscriber.
    pub async fn send_emails(&self) -> Result<BroadcastReport, AppError> {
        self.notifier.broadcast_now().await.map_err(Into::into)
    }
}
