//! Storage backend abstraction used by the issuer
//!
//! The issuer never talks to a storage service directly. It resolves an
//! [`ObjectLocation`], asks the [`ObjectStore`] whether the object exists and
//! hands a [`PresignRequest`] to the store's signing primitive.

mod s3;

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;

use crate::{error::SignedUrlResult, method::SigningMethod};

pub use s3::S3ObjectStore;

/// Header name used to bind the upload content type into a signature
pub const CONTENT_TYPE_HEADER: &str = "content-type";

/// Handle to one object in one bucket
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectLocation {
    /// Bucket name
    pub bucket: String,
    /// Object key
    pub key: String,
}

impl ObjectLocation {
    /// Creates a new object handle
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Signing convention used to build the URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum SigningScheme {
    /// Signing date, explicit expiration delta and canonical request hashing
    #[default]
    #[strum(serialize = "v4")]
    V4,
}

/// Input to the backend's signing primitive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRequest {
    /// Object the URL targets
    pub location: ObjectLocation,
    /// Signing convention
    pub scheme: SigningScheme,
    /// Operation the URL authorizes
    pub method: SigningMethod,
    /// Validity window
    pub expires_in: Duration,
    /// Headers bound into the signature, keyed by lowercase name
    pub headers: BTreeMap<String, String>,
}

/// Signed URL with expiration information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PresignedUrl {
    /// The signed URL
    pub url: String,
    /// Operation the URL authorizes
    pub method: SigningMethod,
    /// UTC instant after which the backend rejects the URL
    pub expires_at: DateTime<Utc>,
    /// Headers the bearer must send with the request
    pub headers: BTreeMap<String, String>,
}

/// Object storage operations the issuer depends on
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Checks whether the object exists
    ///
    /// # Errors
    ///
    /// Returns `SignedUrlError::Upstream` when the backend cannot answer
    async fn object_exists(&self, location: &ObjectLocation) -> SignedUrlResult<bool>;

    /// Signs a URL for the request
    ///
    /// # Errors
    ///
    /// Returns `SignedUrlError::SigningFailure` when signing is not possible
    async fn presign(&self, request: &PresignRequest) -> SignedUrlResult<PresignedUrl>;
}
