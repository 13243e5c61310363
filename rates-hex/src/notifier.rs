//! Rate broadcast to every subscriber.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{info, instrument, warn};

use rates_types::{BroadcastError, Mailer, RateObservation, RateSource, Repository, SubscriberEmail};

use crate::cache::RateCache;

/// Subject line of every rate email.
pub const SUBJECT: &str = "Today's USD to UAH Rate";

/// Body of the rate email, e.g.
/// `Hi! Today is Friday, March 1, 2024 The current rate is 37.50`.
pub fn compose_message(today: NaiveDate, rate: f64) -> String {
    format!(
        "Hi! Today is {} The current rate is {:.2}",
        today.format("%A, %B %-d, %Y"),
        rate
    )
}

/// A recipient the mailer could not deliver to.
#[derive(Debug, Clone)]
pub struct DeliveryFailure {
    pub email: SubscriberEmail,
    pub error: String,
}

/// What a broadcast did.
#[derive(Debug, Clone)]
pub struct BroadcastReport {
    pub rate: RateObservation,
    pub attempted: usize,
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

/// Sends the freshly refreshed rate to all subscribers.
pub struct Notifier<R: Repository, S: RateSource, M: Mailer> {
    cache: Arc<RateCache<R, S>>,
    repo: Arc<R>,
    mailer: M,
}

impl<R: Repository, S: RateSource, M: Mailer> Notifier<R, S, M> {
    pub fn new(cache: Arc<RateCache<R, S>>, repo: Arc<R>, mailer: M) -> Self {
        Self {
            cache,
            repo,
            mailer,
        }
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Refreshes the rate and mails it to every subscriber.
    ///
    /// Only the refresh and the subscriber listing are fatal. A recipient that
    /// cannot be reached is logged, recorded in the report, and skipped.
    #[instrument(skip(self))]
    pub async fn broadcast_now(&self) -> Result<BroadcastReport, BroadcastError> {
        let rate = self
            .cache
            .force_refresh()
            .await
            .map_err(BroadcastError::Refresh)?;

        let body = compose_message(Utc::now().date_naive(), rate.value());

        let subscribers = self
            .repo
            .all_subscribers()
            .await
            .map_err(BroadcastError::Subscribers)?;

        let mut failures = Vec::new();
        for subscriber in &subscribers {
            if let Err(e) = self.mailer.send(&subscriber.email, SUBJECT, &body).await {
                warn!(email = %subscriber.email, error = %e, "Failed to send rate email");
                failures.push(DeliveryFailure {
                    email: subscriber.email.clone(),
                    error: e.to_string(),
                });
            }
        }

        let report = BroadcastReport {
            rate,
            attempted: subscribers.len(),
            delivered: subscribers.len() - failures.len(),
            failures,
        };
        info!(
            attempted = report.attempted,
            delivered = report.delivered,
            rate = rate.value(),
            "Broadcast finished"
        );
        Ok(report)
    }
}
