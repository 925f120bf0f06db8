//! Per-call signing request

use std::time::Duration;

use crate::{
    error::{SignedUrlError, SignedUrlResult},
    method::SigningMethod,
    store::ObjectLocation,
};

/// Default validity window of an issued URL: 120 minutes
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(120 * 60);

/// A request to issue one signed URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignRequest {
    /// Bucket holding the object
    pub bucket: String,
    /// Key of the object within the bucket
    pub object_key: String,
    /// Operation the URL authorizes
    pub method: SigningMethod,
    /// How long the URL stays valid
    pub expires_in: Duration,
    /// MIME type an upload must present, only used by write methods
    pub content_type: Option<String>,
}

impl SignRequest {
    /// Creates a GET request valid for [`DEFAULT_EXPIRY`]
    pub fn new(bucket: impl Into<String>, object_key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            object_key: object_key.into(),
            method: SigningMethod::default(),
            expires_in: DEFAULT_EXPIRY,
            content_type: None,
        }
    }

    /// Sets the method
    #[must_use]
    pub fn method(mut self, method: SigningMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the validity window
    #[must_use]
    pub fn expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_in = expires_in;
        self
    }

    /// Sets the content type an upload must present
    #[must_use]
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Checks the request and resolves the object handle
    ///
    /// # Errors
    ///
    /// Returns `SignedUrlError::InvalidRequest` for an empty bucket or key,
    /// or a zero expiration
    pub fn location(&self) -> SignedUrlResult<ObjectLocation> {
        if self.bucket.is_empty() {
            return Err(SignedUrlError::InvalidRequest(
                "bucket must not be empty".to_string(),
            ));
        }
        if self.object_key.is_empty() {
            return Err(SignedUrlError::InvalidRequest(
                "object key must not be empty".to_string(),
            ));
        }
        if self.expires_in.is_zero() {
            return Err(SignedUrlError::InvalidRequest(
                "expiration must be positive".to_string(),
            ));
        }

        Ok(ObjectLocation::new(&self.bucket, &self.object_key))
    }

    /// Content type to bind into the signature, if any
    ///
    /// Always `None` for non-write methods.
    #[must_use]
    pub fn bound_content_type(&self) -> Option<&str> {
        if self.method.is_write() {
            self.content_type.as_deref()
        } else {
            None
        }
    }
}
