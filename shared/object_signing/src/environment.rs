//! Environment configuration for different deployment stages

use std::env;
use std::sync::Arc;
use std::time::Duration;

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use tracing::Level;

use crate::{
    error::{SignedUrlError, SignedUrlResult},
    issuer::{ExistenceCheck, SignedUrlIssuer},
    request::DEFAULT_EXPIRY,
    store::{ObjectStore, S3ObjectStore},
};

/// Application environment configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment (uses `LocalStack`)
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// Defaults to development when unset.
    ///
    /// # Errors
    ///
    /// Returns `SignedUrlError::Config` if `APP_ENV` contains an invalid value
    pub fn from_env() -> SignedUrlResult<Self> {
        let env = env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .trim()
            .to_lowercase();

        match env.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(SignedUrlError::Config(format!("Invalid environment: {env}"))),
        }
    }

    /// Returns the endpoint URL to use for AWS services
    #[must_use]
    pub const fn override_aws_endpoint_url(&self) -> Option<&str> {
        match self {
            Self::Production | Self::Staging => None,
            Self::Development => Some("http://localhost:4566"),
        }
    }

    /// AWS configuration with timeout settings
    ///
    /// SDK retries are disabled: a transient failure surfaces to the caller
    /// on the first attempt.
    pub async fn aws_config(&self) -> aws_config::SdkConfig {
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(30))
            .build();

        let mut config_builder = aws_config::load_defaults(BehaviorVersion::latest())
            .await
            .to_builder()
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeout_config);

        if let Some(endpoint_url) = self.override_aws_endpoint_url() {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }

        config_builder.build()
    }

    /// AWS S3 service configuration
    pub async fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let aws_config = self.aws_config().await;
        let s3_config: aws_sdk_s3::Config = (&aws_config).into();
        let mut builder = s3_config.to_builder();

        // LocalStack only serves path-style addressing
        if matches!(self, Self::Development) {
            builder.set_force_path_style(Some(true));
        }

        builder.build()
    }

    /// Builds an issuer backed by S3 for this environment
    pub async fn s3_issuer(&self, config: &IssuerConfig) -> SignedUrlIssuer {
        let store = S3ObjectStore::from_conf(self.s3_client_config().await);
        config.build_issuer(Arc::new(store))
    }

    /// Log level, overridable through `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}

/// Issuer settings read from the process environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuerConfig {
    /// Validity window used when a caller does not pick one
    pub default_expiry: Duration,
    /// When the target object must exist
    pub existence_check: ExistenceCheck,
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self {
            default_expiry: DEFAULT_EXPIRY,
            existence_check: ExistenceCheck::default(),
        }
    }
}

impl IssuerConfig {
    /// Reads `SIGNED_URL_EXPIRY_MINS` and `SIGNED_URL_EXISTENCE_CHECK`
    ///
    /// Unset variables fall back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `SignedUrlError::Config` if a variable is set but invalid
    pub fn from_env() -> SignedUrlResult<Self> {
        let mut config = Self::default();

        if let Ok(val) = env::var("SIGNED_URL_EXPIRY_MINS") {
            let secs = val
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|minutes| *minutes > 0)
                .and_then(|minutes| minutes.checked_mul(60))
                .ok_or_else(|| {
                    SignedUrlError::Config(format!("Invalid SIGNED_URL_EXPIRY_MINS: {val}"))
                })?;
            config.default_expiry = Duration::from_secs(secs);
        }

        if let Ok(val) = env::var("SIGNED_URL_EXISTENCE_CHECK") {
            config.existence_check = val.trim().to_lowercase().parse().map_err(|_| {
                SignedUrlError::Config(format!("Invalid SIGNED_URL_EXISTENCE_CHECK: {val}"))
            })?;
        }

        Ok(config)
    }

    /// Builds an issuer over the given store with these settings
    #[must_use]
    pub fn build_issuer(&self, store: Arc<dyn ObjectStore>) -> SignedUrlIssuer {
        SignedUrlIssuer::new(store)
            .with_existence_check(self.existence_check)
            .with_default_expiry(self.default_expiry)
    }
}
