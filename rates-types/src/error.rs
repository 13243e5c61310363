//! Error types for the rate service.

/// Domain-level errors (validation of values entering the system).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    #[error("Rate must be a positive finite number, got {0}")]
    InvalidRate(f64),

    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
}

/// Failures of a single upstream fetch.
///
/// None of these are retried inside the call; the next request that observes
/// a stale rate starts a fresh attempt.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SourceError {
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    #[error("{0} rate not found in upstream response")]
    CurrencyNotFound(String),

    #[error("Cannot parse upstream date {0:?}")]
    DateParseFailure(String),
}

/// Repository-level errors (data access failures).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RepoError {
    #[error("Email {0} is already subscribed")]
    AlreadySubscribed(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// Outcome of a failed refresh, shared with every caller that joined it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RateError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Storage(#[from] RepoError),
}

/// Per-recipient delivery errors.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Invalid mail address: {0}")]
    Address(String),

    #[error("Cannot build message: {0}")]
    Message(String),

    #[error("Mail transport error: {0}")]
    Transport(String),
}

/// Fatal failures of a broadcast. Per-recipient delivery errors are not
/// fatal and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    #[error("Cannot refresh rate: {0}")]
    Refresh(RateError),

    #[error("Cannot list subscribers: {0}")]
    Subscribers(RepoError),
}

/// Application-level errors (for HTTP responses).
///
/// Maps cleanly to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RateError> for AppError {
    fn from(err: RateError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::AlreadySubscribed(_) => AppError::Conflict(err.to_string()),
            RepoError::Database(e) => AppError::Internal(e),
        }
    }
}

impl From<BroadcastError> for AppError {
    fn from(err: BroadcastError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
