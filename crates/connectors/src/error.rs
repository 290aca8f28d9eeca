use model::{capability::CapabilityName, error::ModelError};
use thiserror::Error;

/// Errors raised by data providers and the layers stacked on them.
#[derive(Debug, Error)]
pub enum DataProviderError {
    /// The provider has neither a native nor a fallback implementation.
    #[error("Capability not supported: {0}")]
    CapabilityAbsent(CapabilityName),

    /// Malformed request parameters.
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Failure reported by the underlying source.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Shared state could not be locked.
    #[error("Lock error: {0}")]
    LockError(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
