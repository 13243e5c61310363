//! A single observed USD→UAH exchange rate.

use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

/// One entry of the append-only rate log.
///
/// `timestamp` is when the observation was obtained and is what staleness is
/// measured against. `effective_date` is the date the upstream reported the
/// value for, which may lag the fetch by a day or more.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RateObservation {
    #[schema(value_type = String, example = "2024-03-01T09:30:00Z")]
    timestamp: DateTime<Utc>,
    #[schema(example = 37.5)]
    value: f64,
    #[schema(value_type = String, example = "2024-03-01")]
    effective_date: NaiveDate,
}

impl RateObservation {
    /// Creates a new observation, rejecting non-positive or non-finite values.
    pub fn new(
        timestamp: DateTime<Utc>,
        value: f64,
        effective_date: NaiveDate,
    ) -> Result<Self, DomainError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(DomainError::InvalidRate(value));
        }
        Ok(Self {
            timestamp,
            value,
            effective_date,
        })
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn effective_date(&self) -> NaiveDate {
        self.effective_date
    }

    /// Age of the observation relative to `now`.
    pub fn age(&self, now: DateTime<Utc>) -> TimeDelta {
        now.signed_duration_since(self.timestamp)
    }

    /// True when the observation is older than `threshold` at `now`.
    pub fn is_stale(&self, now: DateTime<Utc>, threshold: Duration) -> bool {
        let threshold = TimeDelta::from_std(threshold).unwrap_or(TimeDelta::MAX);
        self.age(now) > threshold
    }
}
