//! Configuration validation
//!
//! Common validation helpers and the error type returned by `FetchConfig::validate`.

use std::time::Duration;

use crate::protocols::TransportKind;

/// Configuration validation result type
pub type ConfigResult<T> = Result<T, ConfigurationError>;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Invalid timeout value: {0}")]
    InvalidTimeout(String),

    #[error("Invalid configuration parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid transport order: {0}")]
    InvalidTransportOrder(String),

    #[error("Invalid root certificate: {0}")]
    InvalidCertificate(String),
}

/// Common configuration validation utilities
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate timeout duration
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTimeout` if the duration is zero or
    /// exceeds 1 hour.
    pub fn validate_timeout(timeout: Duration, name: &str) -> ConfigResult<()> {
        if timeout.is_zero() {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot be zero"
            )));
        }

        if timeout.as_secs() > 3600 {
            return Err(ConfigurationError::InvalidTimeout(format!(
                "{name} cannot exceed 1 hour"
            )));
        }

        Ok(())
    }

    /// Validate an integer stays within `max`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidParameter` when `value > max`.
    pub fn validate_at_most(value: usize, max: usize, name: &str) -> ConfigResult<()> {
        if value > max {
            return Err(ConfigurationError::InvalidParameter(format!(
                "{name} must be at most {max}, got {value}"
            )));
        }
        Ok(())
    }

    /// Validate that the enabled transports are a non-empty, duplicate-free
    /// subsequence of the preference order HTTP/3, HTTP/2, HTTP/1.1.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidTransportOrder` otherwise.
    pub fn validate_transport_order(transports: &[TransportKind]) -> ConfigResult<()> {
        if transports.is_empty() {
            return Err(ConfigurationError::InvalidTransportOrder(
                "at least one transport must be enabled".to_string(),
            ));
        }

        for pair in transports.windows(2) {
            if pair[0].preference() >= pair[1].preference() {
                return Err(ConfigurationError::InvalidTransportOrder(format!(
                    "{} cannot follow {}",
                    pair[1], pair[0]
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_bounds() {
        assert!(ConfigValidator::validate_timeout(Duration::from_secs(10), "timeout").is_ok());
        assert!(ConfigValidator::validate_timeout(Duration::ZERO, "timeout").is_err());
        assert!(ConfigValidator::validate_timeout(Duration::from_secs(3601), "timeout").is_err());
    }

    #[test]
    fn transport_order_must_follow_preference() {
        use TransportKind::*;

        assert!(ConfigValidator::validate_transport_order(&[Http3, Http2, Http1]).is_ok());
        assert!(ConfigValidator::validate_transport_order(&[Http3, Http1]).is_ok());
        assert!(ConfigValidator::validate_transport_order(&[Http1]).is_ok());

        assert!(ConfigValidator::validate_transport_order(&[]).is_err());
        assert!(ConfigValidator::validate_transport_order(&[Http2, Http3]).is_err());
        assert!(ConfigValidator::validate_transport_order(&[Http2, Http2]).is_err());
    }
}
