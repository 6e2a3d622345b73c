use stockdash_core::AggregateError;
use thiserror::Error;

/// Binary-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("invalid listen address: {0}")]
    InvalidAddress(String),

    #[error("could not install log subscriber: {0}")]
    Telemetry(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Aggregate(AggregateError::Validation(_)) | Self::InvalidAddress(_) => 2,
            Self::Aggregate(AggregateError::Provider { .. }) => 3,
            Self::Serialization(_) => 4,
            Self::Telemetry(_) => 6,
            Self::Io(_) => 10,
        }
    }
}
