//! Signed URL issuance
//!
//! The issuer validates a [`SignRequest`], gates it on object existence
//! according to its [`ExistenceCheck`] policy and asks the [`ObjectStore`] to
//! sign. Each call is independent and owns no state beyond the injected store.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use strum::{Display, EnumString};
use tracing::{error, info, instrument, warn};

use crate::{
    error::{SignedUrlError, SignedUrlResult},
    method::SigningMethod,
    request::{SignRequest, DEFAULT_EXPIRY},
    store::{ObjectStore, PresignRequest, PresignedUrl, SigningScheme, CONTENT_TYPE_HEADER},
};

/// When the issuer requires the target object to exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ExistenceCheck {
    /// Every method requires the object to exist
    Always,
    /// Only non-write methods require the object; uploads may create it
    #[default]
    SkipForWrites,
    /// Never query the backend before signing
    Never,
}

impl ExistenceCheck {
    /// Whether a request with this method must find the object first
    #[must_use]
    pub const fn applies_to(self, method: SigningMethod) -> bool {
        match self {
            Self::Always => true,
            Self::SkipForWrites => !method.is_write(),
            Self::Never => false,
        }
    }
}

/// Issues signed URLs against an object store
#[derive(Clone)]
pub struct SignedUrlIssuer {
    store: Arc<dyn ObjectStore>,
    existence_check: ExistenceCheck,
    default_expiry: Duration,
}

impl std::fmt::Debug for SignedUrlIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignedUrlIssuer")
            .field("existence_check", &self.existence_check)
            .field("default_expiry", &self.default_expiry)
            .finish_non_exhaustive()
    }
}

impl SignedUrlIssuer {
    /// Creates an issuer with the default existence policy
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            existence_check: ExistenceCheck::default(),
            default_expiry: DEFAULT_EXPIRY,
        }
    }

    /// Overrides the existence policy
    #[must_use]
    pub fn with_existence_check(mut self, existence_check: ExistenceCheck) -> Self {
        self.existence_check = existence_check;
        self
    }

    /// Overrides the validity window used by [`Self::request`]
    #[must_use]
    pub fn with_default_expiry(mut self, default_expiry: Duration) -> Self {
        self.default_expiry = default_expiry;
        self
    }

    /// Starts a GET request carrying this issuer's default validity window
    pub fn request(&self, bucket: impl Into<String>, object_key: impl Into<String>) -> SignRequest {
        SignRequest::new(bucket, object_key).expires_in(self.default_expiry)
    }

    /// The active existence policy
    #[must_use]
    pub const fn existence_check(&self) -> ExistenceCheck {
        self.existence_check
    }

    /// Issues a signed URL
    ///
    /// # Errors
    ///
    /// - `SignedUrlError::InvalidRequest` - empty bucket or key, or zero expiration
    /// - `SignedUrlError::NotFound` - the object is missing and the policy requires it
    /// - `SignedUrlError::Upstream` - the existence query failed
    /// - `SignedUrlError::SigningFailure` - the store could not sign
    #[instrument(
        skip(self, request),
        fields(
            bucket = %request.bucket,
            key = %request.object_key,
            method = %request.method,
        )
    )]
    pub async fn issue(&self, request: SignRequest) -> SignedUrlResult<PresignedUrl> {
        let location = request.location().inspect_err(|e| {
            warn!("SIGNED_URL - Rejected request: {e}");
        })?;

        if self.existence_check.applies_to(request.method) {
            let exists = self.store.object_exists(&location).await.inspect_err(|e| {
                error!("SIGNED_URL - Failed to check object existence: {e}");
            })?;

            if !exists {
                warn!(
                    "SIGNED_URL - Could not find object \"{}\" in bucket \"{}\".",
                    location.key, location.bucket
                );
                return Err(SignedUrlError::NotFound {
                    bucket: location.bucket,
                    key: location.key,
                });
            }
        }

        let mut headers = BTreeMap::new();
        if let Some(content_type) = request.bound_content_type() {
            headers.insert(CONTENT_TYPE_HEADER.to_string(), content_type.to_string());
        }

        let presign_request = PresignRequest {
            location,
            scheme: SigningScheme::V4,
            method: request.method,
            expires_in: request.expires_in,
            headers,
        };

        let presigned = self
            .store
            .presign(&presign_request)
            .await
            .map_err(|e| match e {
                SignedUrlError::SigningFailure(_) => e,
                other => SignedUrlError::SigningFailure(other.to_string()),
            })
            .inspect_err(|e| {
                error!("SIGNED_URL - Failed to generate signed URL: {e}");
            })?;

        info!(
            expires_at = %presigned.expires_at,
            "SIGNED_URL - Generated {} signed URL for \"{}\" in bucket \"{}\" valid for {}s.",
            presigned.method,
            presign_request.location.key,
            presign_request.location.bucket,
            presign_request.expires_in.as_secs()
        );

        Ok(presigned)
    }

    /// Issues a signed URL, collapsing every failure into `None`
    ///
    /// The failure reason is only reported through the log.
    pub async fn issue_url(&self, request: SignRequest) -> Option<String> {
        self.issue(request).await.ok().map(|presigned| presigned.url)
    }

    /// Issues a GET URL valid for the issuer's default window
    ///
    /// # Errors
    ///
    /// Same as [`Self::issue`]
    pub async fn issue_get(
        &self,
        bucket: impl Into<String>,
        object_key: impl Into<String>,
    ) -> SignedUrlResult<PresignedUrl> {
        self.issue(self.request(bucket, object_key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_existence_check_policies() {
        for method in SigningMethod::iter() {
            assert!(ExistenceCheck::Always.applies_to(method));
            assert!(!ExistenceCheck::Never.applies_to(method));
        }

        assert!(ExistenceCheck::SkipForWrites.applies_to(SigningMethod::Get));
        assert!(ExistenceCheck::SkipForWrites.applies_to(SigningMethod::Head));
        assert!(ExistenceCheck::SkipForWrites.applies_to(SigningMethod::Delete));
        assert!(!ExistenceCheck::SkipForWrites.applies_to(SigningMethod::Put));
    }

    #[test]
    fn test_existence_check_parsing() {
        assert_eq!(
            "skip_for_writes".parse::<ExistenceCheck>().unwrap(),
            ExistenceCheck::SkipForWrites
        );
        assert_eq!(
            "always".parse::<ExistenceCheck>().unwrap(),
            ExistenceCheck::Always
        );
        assert!("sometimes".parse::<ExistenceCheck>().is_err());
        assert_eq!(ExistenceCheck::default(), ExistenceCheck::SkipForWrites);
    }
}
