use lyricbar_core::CoreError;
use lyricbar_mpris::MprisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Failed to reach the session bus: {0}")]
    Mpris(#[from] MprisError),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("Failed to start the async runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
