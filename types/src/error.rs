//! Parse errors for the shared types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid colour: {0}")]
    InvalidColor(String),

    #[error("unknown job title: {0}")]
    UnknownJob(String),

    #[error("invalid verification code: {0}")]
    InvalidCode(String),
}
