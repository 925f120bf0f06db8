//! Signed URL issuance for object storage
//!
//! Issues time-limited SigV4 URLs that let a bearer perform exactly one
//! operation on one object without holding storage credentials.
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use object_signing::{Environment, IssuerConfig, SignRequest, SigningMethod};
//!
//! # async fn run() -> Result<(), object_signing::SignedUrlError> {
//! let environment = Environment::from_env()?;
//! let issuer = environment.s3_issuer(&IssuerConfig::from_env()?).await;
//!
//! let upload = issuer
//!     .issue(
//!         SignRequest::new("my-bucket", "uploads/new.csv")
//!             .method(SigningMethod::Put)
//!             .content_type("text/csv")
//!             .expires_in(Duration::from_secs(30 * 60)),
//!     )
//!     .await?;
//! println!("{}", upload.url);
//! # Ok(())
//! # }
//! ```

#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    dead_code
)]

mod environment;
mod error;
mod issuer;
mod method;
mod request;

/// Storage backends the issuer can sign against
pub mod store;

/// Tracing subscriber setup
pub mod telemetry;

pub use environment::{Environment, IssuerConfig};
pub use error::{SignedUrlError, SignedUrlResult};
pub use issuer::{ExistenceCheck, SignedUrlIssuer};
pub use method::SigningMethod;
pub use request::{SignRequest, DEFAULT_EXPIRY};
pub use store::{
    ObjectLocation, ObjectStore, PresignRequest, PresignedUrl, S3ObjectStore, SigningScheme,
};
