//! Upstream Exchange Rate Adapter
//!
//! Implements the `RateSource` port against an exchangerate-api style
//! endpoint that answers a single GET with
//!
//! ```json
//! { "rates": { "UAH": 37.5, "EUR": 0.92 }, "date": "2024-03-01" }
//! ```
//!
//! Every call makes exactly one request. The underlying client carries a
//! timeout so a hung connection cannot stall callers indefinitely.
//!
//! # Example
//! ```no_run
//! use std::time::Duration;
//! use exchange_rates::ExchangeRateApi;
//! use rates_types::RateSource;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = ExchangeRateApi::new(exchange_rates::DEFAULT_API_URL, Duration::from_secs(10))?;
//! let rate = source.fetch().await?;
//! println!("1 USD = {:.2} UAH", rate.value());
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use rates_types::{RateObservation, RateSource, SourceError};

/// Public USD-based endpoint used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://api.exchangerate-api.com/v4/latest/USD";

/// Key looked up in the `rates` map.
pub const DEFAULT_CURRENCY: &str = "UAH";

/// Upper bound on one upstream request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    rates: HashMap<String, f64>,
    date: String,
}

/// HTTP client for the upstream "latest rates" endpoint.
pub struct ExchangeRateApi {
    client: reqwest::Client,
    url: String,
    currency: String,
}

impl ExchangeRateApi {
    /// Creates a client for `url` whose requests give up after `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rates/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            currency: DEFAULT_CURRENCY.to_string(),
        })
    }

    /// Looks up `currency` instead of UAH in the response map.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl RateSource for ExchangeRateApi {
    #[instrument(skip(self), fields(url = %self.url, currency = %self.currency))]
    async fn fetch(&self) -> Result<RateObservation, SourceError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| SourceError::UpstreamUnavailable(e.to_string()))?;

        let body = response
            .text()
            .await
            .map_err(|e| SourceError::UpstreamUnavailable(e.to_string()))?;

        let observation = parse_latest(&body, &self.currency, Utc::now())?;
        debug!(
            value = observation.value(),
            date = %observation.effective_date(),
            "Fetched upstream rate"
        );
        Ok(observation)
    }
}

/// Extracts `currency` from a "latest rates" body, stamping it with `fetched_at`.
pub fn parse_latest(
    body: &str,
    currency: &str,
    fetched_at: DateTime<Utc>,
) -> Result<RateObservation, SourceError> {
    let decoded: LatestRatesResponse =
        serde_json::from_str(body).map_err(|e| SourceError::MalformedResponse(e.to_string()))?;

    let value = *decoded
        .rates
        .get(currency)
        .ok_or_else(|| SourceError::CurrencyNotFound(currency.to_string()))?;

    let date = NaiveDate::parse_from_str(&decoded.date, DATE_FORMAT)
        .map_err(|_| SourceError::DateParseFailure(decoded.date.clone()))?;

    RateObservation::new(fetched_at, value, date)
        .map_err(|e| SourceError::MalformedResponse(e.to_string()))
}
