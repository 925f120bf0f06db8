//! S3-backed object store

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use aws_sdk_s3::{
    config::RequestChecksumCalculation,
    error::{DisplayErrorContext, SdkError},
    operation::head_object::HeadObjectError,
    presigning::{PresignedRequest, PresigningConfig},
    Client as S3Client,
};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{
    ObjectLocation, ObjectStore, PresignRequest, PresignedUrl, SigningScheme, CONTENT_TYPE_HEADER,
};
use crate::{
    error::{SignedUrlError, SignedUrlResult},
    method::SigningMethod,
};

/// Object store backed by an S3 client
///
/// Existence is answered by `HeadObject`, URLs are signed locally by the
/// SDK's SigV4 presigner using whatever credentials the client was built with.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
}

impl S3ObjectStore {
    /// Creates a new S3 object store
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>) -> Self {
        Self { s3_client }
    }

    /// Creates an S3 object store from a client config
    ///
    /// Flexible checksums are only calculated when an operation requires
    /// them, so presigned uploads bind no `x-amz-checksum-*` parameters the
    /// bearer could not reproduce.
    #[must_use]
    pub fn from_conf(config: aws_sdk_s3::Config) -> Self {
        let config = config
            .to_builder()
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .build();

        Self::new(Arc::new(S3Client::from_conf(config)))
    }

    /// Builds the presigning config, rejecting windows S3 does not allow
    fn presigning_config(
        start_time: SystemTime,
        expires_in: Duration,
    ) -> SignedUrlResult<PresigningConfig> {
        PresigningConfig::builder()
            .start_time(start_time)
            .expires_in(expires_in)
            .build()
            .map_err(|e| {
                SignedUrlError::SigningFailure(format!("Failed to create presigning config: {e}"))
            })
    }

    /// Extracts the content type from the bound headers
    ///
    /// S3 can only bind `content-type`, and only on uploads.
    fn content_type(request: &PresignRequest) -> SignedUrlResult<Option<String>> {
        let mut content_type = None;

        for (name, value) in &request.headers {
            if !name.eq_ignore_ascii_case(CONTENT_TYPE_HEADER) {
                return Err(SignedUrlError::SigningFailure(format!(
                    "header {name} cannot be bound into an S3 signature"
                )));
            }
            if !request.method.is_write() {
                return Err(SignedUrlError::SigningFailure(format!(
                    "content type cannot be bound into a {} signature",
                    request.method
                )));
            }
            content_type = Some(value.clone());
        }

        Ok(content_type)
    }
}

fn signing_failure<E>(err: SdkError<E>) -> SignedUrlError
where
    E: std::error::Error + 'static,
{
    SignedUrlError::SigningFailure(format!(
        "Failed to generate presigned URL: {}",
        DisplayErrorContext(err)
    ))
}

fn required_headers(presigned: &PresignedRequest) -> BTreeMap<String, String> {
    presigned
        .headers()
        .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
        .collect()
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn object_exists(&self, location: &ObjectLocation) -> SignedUrlResult<bool> {
        debug!(bucket = %location.bucket, key = %location.key, "Checking if object exists");

        let result = self
            .s3_client
            .head_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(SdkError::ServiceError(service_err))
                if matches!(service_err.err(), HeadObjectError::NotFound(_))
                    || service_err.raw().status().as_u16() == 404 =>
            {
                Ok(false)
            }
            Err(e) => {
                debug!(
                    bucket = %location.bucket,
                    key = %location.key,
                    "HeadObject failed: {}",
                    DisplayErrorContext(&e)
                );
                Err(SignedUrlError::from(e))
            }
        }
    }

    async fn presign(&self, request: &PresignRequest) -> SignedUrlResult<PresignedUrl> {
        // The SDK presigner only speaks SigV4
        debug_assert_eq!(request.scheme, SigningScheme::V4);

        let content_type = Self::content_type(request)?;
        let start_time = SystemTime::now();
        let config = Self::presigning_config(start_time, request.expires_in)?;

        let bucket = &request.location.bucket;
        let key = &request.location.key;

        let presigned = match request.method {
            SigningMethod::Get => self
                .s3_client
                .get_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(signing_failure)?,
            SigningMethod::Head => self
                .s3_client
                .head_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(signing_failure)?,
            SigningMethod::Put => self
                .s3_client
                .put_object()
                .bucket(bucket)
                .key(key)
                .set_content_type(content_type)
                .presigned(config)
                .await
                .map_err(signing_failure)?,
            SigningMethod::Delete => self
                .s3_client
                .delete_object()
                .bucket(bucket)
                .key(key)
                .presigned(config)
                .await
                .map_err(signing_failure)?,
        };

        let expires_at = DateTime::<Utc>::from(start_time) + request.expires_in;

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            method: request.method,
            expires_at,
            headers: required_headers(&presigned),
        })
    }
}
