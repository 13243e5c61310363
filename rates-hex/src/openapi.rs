//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use rates_types::domain::RateObservation;
use rates_types::dto::{ErrorResponse, RateResponse, StatusResponse};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Liveness probe
#[utoipa::path(
    get,
    path = "/ping",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = String, example = json!("pong"))
    )
)]
async fn ping() {}

/// Current USD to UAH rate
#[utoipa::path(
    get,
    path = "/rate",
    tag = "rate",
    responses(
        (status = 200, description = "Current rate", body = RateResponse),
        (status = 400, description = "Rate could not be refreshed", body = ErrorResponse),
        (status = 429, description = "Per-client quota exceeded (only when rate limiting is enabled)", body = ErrorResponse)
    )
)]
async fn rate() {}

/// Subscribe an email address to the rate broadcast
#[utoipa::path(
    post,
    path = "/subscribe/{email}",
    tag = "subscription",
    params(
        ("email" = String, Path, description = "Email address to subscribe")
    ),
    responses(
        (status = 200, description = "Subscribed", body = StatusResponse, example = json!({"status": "subscribed"})),
        (status = 400, description = "Invalid email address", body = ErrorResponse),
        (status = 409, description = "Email already subscribed", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
async fn subscribe() {}

/// Refresh the rate and email every subscriber
#[utoipa::path(
    post,
    path = "/sendEmails",
    tag = "subscription",
    responses(
        (status = 200, description = "Broadcast finished", body = StatusResponse, example = json!({"status": "sent emails"})),
        (status = 500, description = "Rate refresh or subscriber listing failed", body = ErrorResponse)
    )
)]
async fn send_emails() {}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "USD/UAH Rate API",
        version = "0.1.0",
        description = "Current USD to UAH exchange rate with email subscriptions"
    ),
    paths(ping, rate, subscribe, send_emails),
    components(schemas(RateResponse, StatusResponse, ErrorResponse, RateObservation)),
    tags(
        (name = "health", description = "Liveness"),
        (name = "rate", description = "Exchange rate"),
        (name = "subscription", description = "Email subscriptions and broadcasts")
    )
)]
pub struct ApiDoc;
