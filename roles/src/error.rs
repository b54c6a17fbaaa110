use senatus_game::GameError;
use senatus_platform::PlatformError;
use senatus_store::StoreError;
use senatus_types::JobTitle;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RoleError {
    #[error("game lookup failed: {0}")]
    ExternalLookupFailed(#[from] GameError),

    #[error("role operation failed: {0}")]
    RoleOperationFailed(#[from] PlatformError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("{0} role still missing after creation")]
    JobRoleMissing(JobTitle),
}
