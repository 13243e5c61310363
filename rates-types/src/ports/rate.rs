//! Rate log and upstream rate source ports.

use std::sync::Arc;

use crate::domain::RateObservation;
use crate::error::{RepoError, SourceError};

/// Durable append-only log of rate observations.
///
/// `append` MUST be atomic with respect to concurrent `latest` reads: a reader
/// never observes a partially written record.
#[async_trait::async_trait]
pub trait RateStore: Send + Sync + 'static {
    /// Returns the observation with the greatest timestamp, if any.
    async fn latest(&self) -> Result<Option<RateObservation>, RepoError>;

    /// Appends a new observation. There is no update or delete.
    async fn append(&self, observation: RateObservation) -> Result<(), RepoError>;
}

/// Adapter to an external exchange-rate provider.
///
/// Implementations make exactly one attempt per call; retrying is up to the
/// caller.
#[async_trait::async_trait]
pub trait RateSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<RateObservation, SourceError>;
}

#[async_trait::async_trait]
impl<T: RateSource + ?Sized> RateSource for Arc<T> {
    async fn fetch(&self) -> Result<RateObservation, SourceError> {
        (**self).fetch().await
    }
}
