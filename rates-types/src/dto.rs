//! Data Transfer Objects (DTOs) for HTTP responses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response carrying the current USD→UAH rate.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateResponse {
    /// UAH per one USD
    #[schema(example = 37.5)]
    pub number: f64,
}

/// Plain status acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    #[schema(example = "subscribed")]
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }
}

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Short label for the failure class
    #[schema(example = "subscription conflict")]
    pub status: String,
    /// Human readable cause
    #[schema(example = "Email a@x.com is already subscribed")]
    pub error: String,
}
