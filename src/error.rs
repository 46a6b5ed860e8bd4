use thiserror::Error;

/// Failures surfaced to the bridge caller as tagged results.
///
/// Every variant maps to a synchronous failure of the originating call;
/// mid-session engine errors are absorbed and logged instead.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("audio source path is empty or cannot be resolved: {0}")]
    InvalidSource(String),

    #[error("failed to prepare player: {0}")]
    PrepareFailed(String),

    #[error("failed to start recording: {0}")]
    StartFailed(String),

    #[error("output directory is missing or not accessible: {0}")]
    DirectoryUnavailable(String),

    #[error("{0} permission denied")]
    PermissionDenied(&'static str),

    #[error("player has no prepared source")]
    NotPrepared,

    #[error("no active recording")]
    NotRecording,

    #[error("unknown bridge method: {0}")]
    UnknownMethod(String),

    #[error("invalid call arguments: {0}")]
    BadArguments(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BridgeError>;
