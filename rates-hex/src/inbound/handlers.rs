//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;

use rates_types::{AppError, ErrorResponse, Mailer, RateResponse, RateSource, Repository, StatusResponse};

use crate::ExchangeService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<R: Repository, S: RateSource, M: Mailer> {
    pub service: ExchangeService<R, S, M>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, label, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad request", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "subscription conflict", msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error", msg)
            }
        };

        let body = ErrorResponse {
            status: label.to_string(),
            error: message,
        };

        (status, Json(body)).into_response()
    }
}

/// Liveness probe.
pub async fn ping() -> &'static str {
    "pong"
}

/// Current USD to UAH rate.
#[tracing::instrument(skip(state))]
pub async fn rate<R: Repository, S: RateSource, M: Mailer>(
    State(state): State<Arc<AppState<R, S, M>>>,
) -> Result<Json<RateResponse>, ApiError> {
    let rate = state.service.current_rate().await?;
    Ok(Json(RateResponse {
        number: rate.value(),
    }))
}

/// Subscribe an email address to the rate broadcast.
#[tracing::instrument(skip(state))]
pub async fn subscribe<R: Repository, S: RateSource, M: Mailer>(
    State(state): State<Arc<AppState<R, S, M>>>,
    Path(email): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let subscriber = state.service.subscribe(&email).await?;
    tracing::info!(email = %subscriber.email, "Subscribed");
    Ok(Json(StatusResponse::new("subscribed")))
}

/// Refresh the rate and email every subscriber.
#[tracing::instrument(skip(state))]
pub async fn send_emails<R: Repository, S: RateSource, M: Mailer>(
    State(state): State<Arc<AppState<R, S, M>>>,
) -> Result<Json<StatusResponse>, ApiError> {
    let report = state.service.send_emails().await?;
    if !report.failures.is_empty() {
        tracing::warn!(
            failed = report.failures.len(),
            delivered = report.delivered,
            "Some rate emails were not delivered"
        );
    }
    Ok(Json(StatusResponse::new("sent emails")))
}

/// OpenAPI document as JSON.
pub async fn openapi_json() -> impl IntoResponse {
    (StatusCode::OK, Json(ApiDoc::openapi()))
}
