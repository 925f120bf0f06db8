//! Error types for signed URL issuance

use aws_sdk_s3::{error::SdkError, operation::head_object::HeadObjectError};
use thiserror::Error;

/// Result type for signed URL operations
pub type SignedUrlResult<T> = Result<T, SignedUrlError>;

/// Errors that can occur while issuing a signed URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignedUrlError {
    /// Target object does not exist at check time
    #[error("Object not found: s3://{bucket}/{key}")]
    NotFound {
        /// Bucket that was queried
        bucket: String,
        /// Object key that was queried
        key: String,
    },

    /// The signing primitive rejected the request or could not run
    #[error("Signing failed: {0}")]
    SigningFailure(String),

    /// The existence query failed before a verdict was reached
    #[error("Upstream service error: {0}")]
    Upstream(String),

    /// Request rejected before any backend call
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SignedUrlError {
    /// Whether the failure means the object is missing, as opposed to a
    /// backend or request problem
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<SdkError<HeadObjectError>> for SignedUrlError {
    fn from(error: SdkError<HeadObjectError>) -> Self {
        match error {
            SdkError::ServiceError(err) => Self::Upstream(format!(
                "HeadObject returned {}: {:?}",
                err.raw().status().as_u16(),
                err.err()
            )),
            _ => Self::Upstream(error.to_string()),
        }
    }
}
