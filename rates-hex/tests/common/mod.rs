//! Shared fixtures for the router integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use chrono::{NaiveDate, Utc};
use http_body_util::BodyExt;

use rates_hex::inbound::HttpServer;
use rates_hex::{ExchangeService, RateCacheConfig};
use rates_repo::SqliteRepo;
use rates_types::{MailError, Mailer, RateObservation, RateSource, SourceError, SubscriberEmail};

/// Upstream double returning a fixed value, or a fixed error.
pub struct StubSource {
    pub value: Result<f64, SourceError>,
    pub calls: AtomicUsize,
}

impl StubSource {
    pub fn returning(value: f64) -> Self {
        Self {
            value: Ok(value),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(error: SourceError) -> Self {
        Self {
            value: Err(error),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RateSource for StubSource {
    async fn fetch(&self) -> Result<RateObservation, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value = self.value.clone()?;
        Ok(RateObservation::new(
            Utc::now(),
            value,
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        )
        .unwrap())
    }
}

/// Mail double recording recipients.
#[derive(Default)]
pub struct StubMailer {
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl Mailer for StubMailer {
    async fn send(&self, to: &SubscriberEmail, _subject: &str, _body: &str) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

pub type TestServer = HttpServer<SqliteRepo, StubSource, StubMailer>;

async fn service(source: StubSource) -> ExchangeService<SqliteRepo, StubSource, StubMailer> {
    let repo = SqliteRepo::new("sqlite::memory:").await.unwrap();
    ExchangeService::new(
        repo,
        source,
        StubMailer::default(),
        RateCacheConfig::default(),
    )
}

/// Server over an in-memory database, without rate limiting.
pub async fn server(source: StubSource) -> TestServer {
    HttpServer::new(service(source).await)
}

/// Server over an in-memory database with a per-peer quota.
pub async fn limited_server(source: StubSource, requests_per_minute: u32) -> TestServer {
    HttpServer::with_rate_limit(service(source).await, requests_per_minute)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}
