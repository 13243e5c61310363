//! In-memory port implementations shared by the unit tests.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeDelta, Utc};

use rates_types::{
    MailError, Mailer, RateObservation, RateSource, RateStore, RepoError, SourceError, Subscriber,
    SubscriberEmail, SubscriptionStore,
};

pub fn observation(minutes_ago: i64, value: f64) -> RateObservation {
    RateObservation::new(
        Utc::now() - TimeDelta::minutes(minutes_ago),
        value,
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    )
    .unwrap()
}

pub fn email(raw: &str) -> SubscriberEmail {
    SubscriberEmail::parse(raw).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository
// ─────────────────────────────────────────────────────────────────────────────

/// Simple in-memory repository implementing both stores.
#[derive(Default)]
pub struct MockRepo {
    rates: Mutex<Vec<RateObservation>>,
    subscribers: Mutex<Vec<Subscriber>>,
    pub fail_latest: AtomicBool,
    pub fail_append: AtomicBool,
    pub fail_listing: AtomicBool,
}

impl MockRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(observation: RateObservation) -> Self {
        let repo = Self::new();
        repo.rates.lock().unwrap().push(observation);
        repo
    }

    pub fn rate_count(&self) -> usize {
        self.rates.lock().unwrap().len()
    }
}

#[async_trait]
impl RateStore for MockRepo {
    async fn latest(&self) -> Result<Option<RateObservation>, RepoError> {
        if self.fail_latest.load(Ordering::SeqCst) {
            return Err(RepoError::Database("read failed".into()));
        }
        Ok(self
            .rates
            .lock()
            .unwrap()
            .iter()
            .max_by_key(|r| r.timestamp())
            .copied())
    }

    async fn append(&self, observation: RateObservation) -> Result<(), RepoError> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(RepoError::Database("write failed".into()));
        }
        self.rates.lock().unwrap().push(observation);
        Ok(())
    }
}

#[async_trait]
impl SubscriptionStore for MockRepo {
    async fn try_subscribe(&self, email: &SubscriberEmail) -> Result<Subscriber, RepoError> {
        let mut subscribers = self.subscribers.lock().unwrap();
        if subscribers.iter().any(|s| &s.email == email) {
            return Err(RepoError::AlreadySubscribed(email.to_string()));
        }
        let subscriber = Subscriber::new(email.clone());
        subscribers.push(subscriber.clone());
        Ok(subscriber)
    }

    async fn all_subscribers(&self) -> Result<Vec<Subscriber>, RepoError> {
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(RepoError::Database("listing failed".into()));
        }
        Ok(self.subscribers.lock().unwrap().clone())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate source
// ─────────────────────────────────────────────────────────────────────────────

/// Counting rate source with optional latency and failure.
pub struct MockSource {
    pub calls: AtomicUsize,
    value: Mutex<f64>,
    delay: Duration,
    error: Mutex<Option<SourceError>>,
}

impl MockSource {
    pub fn returning(value: f64) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            value: Mutex::new(value),
            delay: Duration::ZERO,
            error: Mutex::new(None),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        let source = Self::returning(1.0);
        *source.error.lock().unwrap() = Some(error);
        source
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_value(&self, value: f64) {
        *self.value.lock().unwrap() = value;
    }

    pub fn set_error(&self, error: Option<SourceError>) {
        *self.error.lock().unwrap() = error;
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RateSource for MockSource {
    async fn fetch(&self) -> Result<RateObservation, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if let Some(error) = self.error.lock().unwrap().clone() {
            return Err(error);
        }
        let value = *self.value.lock().unwrap();
        Ok(observation(0, value))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Mailer
// ─────────────────────────────────────────────────────────────────────────────

/// Records every delivered message; refuses the configured recipients.
#[derive(Default)]
pub struct MockMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
    pub attempts: AtomicUsize,
    rejected: HashSet<String>,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(addresses: &[&str]) -> Self {
        Self {
            rejected: addresses.iter().map(|a| a.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(to, _, _)| to.clone())
            .collect()
    }
}

#[async_trait]
impl Mailer for MockMailer {
    async fn send(&self, to: &SubscriberEmail, subject: &str, body: &str) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.rejected.contains(to.as_str()) {
            return Err(MailError::Transport(format!("550 mailbox {to} unavailable")));
        }
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}
