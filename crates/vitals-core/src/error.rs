//! Shared error type across vitals crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, VitalsError>;

/// Unified error type used by the service and the traffic driver.
///
/// Simulated endpoint failures are *not* represented here: those are normal
/// responses carrying an [`ErrorKind`](crate::profile::ErrorKind).
#[derive(Debug, Error)]
pub enum VitalsError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("internal: {0}")]
    Internal(String),
}

impl VitalsError {
    /// Short stable tag, used as a structured log field.
    pub fn tag(&self) -> &'static str {
        match self {
            VitalsError::Config(_) => "CONFIG",
            VitalsError::InvalidArgument(_) => "INVALID_ARGUMENT",
            VitalsError::Io(_) => "IO",
            VitalsError::Internal(_) => "INTERNAL",
        }
    }
}
