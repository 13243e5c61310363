//! # Rates Client SDK
//!
//! A typed Rust client for the USD/UAH rate API.

use rates_types::{RateResponse, StatusResponse};
use reqwest::Client;
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// True when the server answered 409 (email already subscribed).
    pub fn is_conflict(&self) -> bool {
        matches!(self, ClientError::Api { status: 409, .. })
    }
}

/// Rate API client.
pub struct RatesClient {
    base_url: String,
    http: Client,
}

impl RatesClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks that the API answers `pong`.
    pub async fn ping(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/ping", self.base_url))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Ok(false);
        }
        Ok(resp.text().await?.trim() == "pong")
    }

    /// Current USD to UAH rate.
    pub async fn rate(&self) -> Result<f64, ClientError> {
        let resp: RateResponse = self.get("/rate").await?;
        Ok(resp.number)
    }

    /// Subscribes an email address to the rate broadcast.
    ///
    /// The address is sent as one percent-encoded path segment.
    pub async fn subscribe(&self, email: &str) -> Result<StatusResponse, ClientError> {
        let url = self.subscribe_url(email)?;
        let resp = self.http.post(url).send().await?;
        self.handle_response(resp).await
    }

    fn subscribe_url(&self, email: &str) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("subscribe")
            .push(email.trim());
        Ok(url)
    }

    /// Asks the server to email the current rate to every subscriber.
    pub async fn send_emails(&self) -> Result<StatusResponse, ClientError> {
        self.post("/sendEmails").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
