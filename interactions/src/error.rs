use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InteractionError {
    #[error("invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("missing header {0}")]
    MissingHeader(&'static str),

    #[error("request signature does not verify")]
    BadSignature,

    #[error("malformed interaction: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for InteractionError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MissingHeader(_) | Self::BadSignature => StatusCode::UNAUTHORIZED,
            Self::Malformed(_) => StatusCode::BAD_REQUEST,
            Self::InvalidPublicKey(_) | Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}
