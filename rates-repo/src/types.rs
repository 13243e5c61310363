//! Database row types and their conversion into domain values.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::FromRow;

use rates_types::{RateObservation, RepoError, Subscriber, SubscriberEmail};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub fn encode_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_timestamp(raw: &str) -> Result<DateTime<Utc>, RepoError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepoError::Database(format!("Invalid timestamp {raw:?}: {e}")))
}

pub fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Rate row from `usd_uah_rate`.
#[derive(FromRow)]
pub struct DbRate {
    pub timestamp: String,
    pub value: f64,
    pub effective_date: String,
}

impl DbRate {
    pub fn into_domain(self) -> Result<RateObservation, RepoError> {
        let timestamp = decode_timestamp(&self.timestamp)?;
        let effective_date = NaiveDate::parse_from_str(&self.effective_date, DATE_FORMAT)
            .map_err(|e| {
                RepoError::Database(format!("Invalid date {:?}: {e}", self.effective_date))
            })?;

        RateObservation::new(timestamp, self.value, effective_date)
            .map_err(|e| RepoError::Database(e.to_string()))
    }
}

/// Subscription row from `subscription`.
#[derive(FromRow)]
pub struct DbSubscription {
    pub timestamp: String,
    pub email: String,
}

impl DbSubscription {
    pub fn into_domain(self) -> Result<Subscriber, RepoError> {
        let subscribed_at = decode_timestamp(&self.timestamp)?;
        let email =
            SubscriberEmail::parse(&self.email).map_err(|e| RepoError::Database(e.to_string()))?;
        Ok(Subscriber::from_parts(email, subscribed_at))
    }
}
