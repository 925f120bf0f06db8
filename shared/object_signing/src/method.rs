//! HTTP methods a signed URL can authorize

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::{SignedUrlError, SignedUrlResult};

/// HTTP method bound into a signed URL
///
/// Limited to the verbs the S3 presigner supports. Parsing is
/// case-sensitive: `"GET"` is accepted, `"get"` is not.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum SigningMethod {
    /// Download the object
    #[default]
    Get,
    /// Read object metadata
    Head,
    /// Upload the object
    Put,
    /// Remove the object
    Delete,
}

impl SigningMethod {
    /// Parses a method name, rejecting anything outside the supported set
    ///
    /// # Errors
    ///
    /// Returns `SignedUrlError::InvalidRequest` for unknown or lowercase verbs
    pub fn parse(method: &str) -> SignedUrlResult<Self> {
        method
            .parse()
            .map_err(|_| SignedUrlError::InvalidRequest(format!("unsupported method: {method:?}")))
    }

    /// Whether the method writes object content
    ///
    /// Write methods may target objects that do not exist yet and are the
    /// only ones that bind a `Content-Type` into the signature.
    #[must_use]
    pub const fn is_write(self) -> bool {
        matches!(self, Self::Put)
    }
}
