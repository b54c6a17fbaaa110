use thiserror::Error;

#[derive(Debug, Error)]
pub enum BotError {
    #[error("verification error: {0}")]
    Verification(#[from] senatus_verification::VerificationError),

    #[error("role error: {0}")]
    Role(#[from] senatus_roles::RoleError),

    #[error("game error: {0}")]
    Game(#[from] senatus_game::GameError),

    #[error("platform error: {0}")]
    Platform(#[from] senatus_platform::PlatformError),

    #[error("store error: {0}")]
    Store(#[from] senatus_store::StoreError),

    #[error("config error: {0}")]
    Config(String),
}
