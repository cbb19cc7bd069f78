//! Backend error type

use thiserror::Error;

/// Errors raised by GPU context implementations and the material provider.
///
/// Every variant is fatal: a failed allocation or resolve leaves the context
/// in an unusable state, so the load is aborted rather than retried.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to initialize context: {0}")]
    InitializationFailed(String),
    #[error("Failed to create buffer: {0}")]
    BufferCreationFailed(String),
    #[error("Failed to create vertex layout: {0}")]
    LayoutCreationFailed(String),
    #[error("Failed to resolve material '{name}': {reason}")]
    MaterialResolveFailed { name: String, reason: String },
    #[error("Out of memory")]
    OutOfMemory,
}

pub type BackendResult<T> = Result<T, BackendError>;
