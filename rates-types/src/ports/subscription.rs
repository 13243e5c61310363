//! Subscription store port.

use crate::domain::{Subscriber, SubscriberEmail};
use crate::error::RepoError;

#[async_trait::async_trait]
pub trait SubscriptionStore: Send + Sync + 'static {
    /// Inserts the email stamped with the current time.
    ///
    /// Fails with `RepoError::AlreadySubscribed` when the email is present.
    async fn try_subscribe(&self, email: &SubscriberEmail) -> Result<Subscriber, RepoError>;

    /// Snapshot of every subscriber, oldest first.
    async fn all_subscribers(&self) -> Result<Vec<Subscriber>, RepoError>;
}
