//! Tracing subscriber setup

use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

use crate::{
    environment::Environment,
    error::{SignedUrlError, SignedUrlResult},
};

/// Installs the global tracing subscriber for the environment
///
/// JSON output for staging and production, human-readable output for
/// development. `RUST_LOG` directives take precedence over the environment's
/// default level.
///
/// # Errors
///
/// Returns `SignedUrlError::Config` if a global subscriber is already set
pub fn init_tracing(environment: Environment) -> SignedUrlResult<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(environment.tracing_level()).into())
        .from_env_lossy();

    let result = match environment {
        Environment::Production | Environment::Staging => {
            fmt().json().with_env_filter(filter).try_init()
        }
        Environment::Development => fmt().with_env_filter(filter).try_init(),
    };

    result.map_err(|e| SignedUrlError::Config(format!("Failed to install tracing subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_install_is_config_error() {
        let _ = init_tracing(Environment::Development);

        assert!(matches!(
            init_tracing(Environment::Production),
            Err(SignedUrlError::Config(_))
        ));
    }
}
