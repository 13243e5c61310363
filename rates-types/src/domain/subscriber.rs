//! Email subscribers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::DomainError;

const MAX_EMAIL_LEN: usize = 254;

/// A validated, normalized email address.
///
/// Normalization only trims surrounding whitespace. Case is preserved and
/// comparisons are case-sensitive, so `A@x.com` and `a@x.com` are two
/// different subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "a@x.com")]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let email = raw.trim();
        let invalid = || DomainError::InvalidEmail(raw.to_string());

        if email.is_empty() || email.len() > MAX_EMAIL_LEN {
            return Err(invalid());
        }
        if email.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') {
            return Err(invalid());
        }
        if domain.split('.').any(str::is_empty) {
            return Err(invalid());
        }

        Ok(Self(email.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SubscriberEmail {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SubscriberEmail> for String {
    fn from(email: SubscriberEmail) -> Self {
        email.0
    }
}

/// A subscription record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Subscriber {
    pub email: SubscriberEmail,
    #[schema(value_type = String, example = "2024-03-01T09:30:00Z")]
    pub subscribed_at: DateTime<Utc>,
}

impl Subscriber {
    /// Creates a subscription stamped with the current time.
    pub fn new(email: SubscriberEmail) -> Self {
        Self {
            email,
            subscribed_at: Utc::now(),
        }
    }

    /// Reconstructs a subscriber from persisted parts.
    pub fn from_parts(email: SubscriberEmail, subscribed_at: DateTime<Utc>) -> Self {
        Self {
            email,
            subscribed_at,
        }
    }
}
