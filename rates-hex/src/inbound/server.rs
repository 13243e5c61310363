//! HTTP Server configuration and startup.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use rates_types::{Mailer, RateSource, Repository};

use super::handlers::{self, AppState};
use super::rate_limit::{RateLimiterState, rate_limit_middleware};
use crate::ExchangeService;

/// HTTP Server for the rate API.
pub struct HttpServer<R: Repository, S: RateSource, M: Mailer> {
    state: Arc<AppState<R, S, M>>,
    /// Per-client quota. No limiting when `None`.
    rate_limiter: Option<Arc<RateLimiterState>>,
}

impl<R: Repository, S: RateSource, M: Mailer> HttpServer<R, S, M> {
    /// Creates a new HTTP server with the given service. No rate limiting.
    pub fn new(service: ExchangeService<R, S, M>) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: None,
        }
    }

    /// Creates a new HTTP server that limits each peer address to
    /// `requests_per_minute`.
    pub fn with_rate_limit(service: ExchangeService<R, S, M>, requests_per_minute: u32) -> Self {
        Self {
            state: Arc::new(AppState { service }),
            rate_limiter: Some(Arc::new(RateLimiterState::new(
                requests_per_minute,
                Duration::from_secs(60),
            ))),
        }
    }

    pub fn service(&self) -> &ExchangeService<R, S, M> {
        &self.state.service
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .route("/ping", get(handlers::ping))
            .route("/rate", get(handlers::rate::<R, S, M>))
            .route("/subscribe/{email}", post(handlers::subscribe::<R, S, M>))
            .route("/sendEmails", post(handlers::send_emails::<R, S, M>))
            .route("/api-docs/openapi.json", get(handlers::openapi_json));

        if let Some(limiter) = &self.rate_limiter {
            router = router.layer(middleware::from_fn_with_state(
                limiter.clone(),
                rate_limit_middleware,
            ));
        }

        router
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        let pruner = self.rate_limiter.clone().map(RateLimiterState::spawn_pruner);

        let served = axum::serve(
            listener,
            self.router()
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal())
        .await;

        if let Some(pruner) = pruner {
            pruner.abort();
        }
        served?;
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
