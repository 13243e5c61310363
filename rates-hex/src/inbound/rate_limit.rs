//! Rate limiting middleware using Governor.
//!
//! Optional token bucket per client, keyed by the TCP peer address. Headers
//! are never consulted, so a client cannot pick its own bucket.

use axum::{
    Json,
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{
    net::{IpAddr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use rates_types::ErrorResponse;

/// How often idle client buckets are dropped.
pub const PRUNE_INTERVAL: Duration = Duration::from_secs(60);

/// Rate limiter state shared across requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<IpAddr>,
}

impl RateLimiterState {
    /// Creates a limiter allowing `requests` per `period` for each client.
    ///
    /// Zero values are raised to the smallest valid quota.
    pub fn new(requests: u32, period: Duration) -> Self {
        let burst = NonZeroU32::new(requests).unwrap_or(NonZeroU32::MIN);
        let quota = Quota::with_period(period / burst.get())
            .unwrap_or_else(|| Quota::per_minute(burst))
            .allow_burst(burst);

        Self {
            limiter: RateLimiter::keyed(quota),
        }
    }

    /// Returns true if the request is allowed, false if rate limited.
    pub fn check(&self, client: IpAddr) -> bool {
        self.limiter.check_key(&client).is_ok()
    }

    /// Drops buckets that have refilled completely.
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.limiter.len()
    }

    /// Prunes on a fixed interval until the returned handle is aborted.
    pub fn spawn_pruner(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(PRUNE_INTERVAL);
            loop {
                interval.tick().await;
                self.prune();
            }
        })
    }
}

/// Rate limiting middleware. `/ping` is never limited, and requests without
/// a peer address (in-process calls) pass through.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.uri().path() == "/ping" {
        return next.run(request).await;
    }

    let Some(ConnectInfo(peer)) = request.extensions().get::<ConnectInfo<SocketAddr>>().copied()
    else {
        return next.run(request).await;
    };

    if !limiter.check(peer.ip()) {
        tracing::warn!(client = %peer.ip(), "Rate limit exceeded");
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                status: "too many requests".into(),
                error: "Rate limit exceeded. Please try again later.".into(),
            }),
        )
            .into_response();
    }

    next.run(request).await
}
