use thiserror::Error;

/// The single failure type returned by every game fetch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("HTTP request to game API failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from game API: {0}")]
    InvalidResponse(String),

    #[error("game API unreachable: {0}")]
    Unreachable(String),
}
