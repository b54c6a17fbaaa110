use senatus_game::GameError;
use senatus_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("game account lookup failed: {0}")]
    ExternalLookupFailed(#[from] GameError),

    #[error("{0} is not an administrator")]
    PermissionDenied(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
