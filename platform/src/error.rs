use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("missing permissions: {0}")]
    Forbidden(String),

    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("request to chat platform failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from chat platform: {0}")]
    InvalidResponse(String),

    #[error("chat platform unreachable: {0}")]
    Unreachable(String),
}
