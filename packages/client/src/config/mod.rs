//! Fetch configuration
//!
//! One read-mostly `FetchConfig` is built per process and shared by every
//! transport in a `Cascade`. Nothing in it is mutated per request.

use std::time::Duration;

pub mod validation;

pub use validation::{ConfigResult, ConfigValidator, ConfigurationError};

use crate::protocols::TransportKind;

/// Per-attempt deadline used by every transport.
pub const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirect hops followed within one attempt.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

const MAX_REDIRECT_LIMIT: usize = 50;

/// TLS trust configuration. Certificate verification is always enabled.
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Load the platform's native root certificates in addition to webpki roots
    pub use_native_certs: bool,
    /// Extra PEM-encoded root certificates to trust
    pub extra_root_certs_pem: Vec<Vec<u8>>,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            use_native_certs: true,
            extra_root_certs_pem: Vec::new(),
        }
    }
}

/// Configuration for a `Cascade`.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Deadline for one transport attempt, redirects and body read included
    pub timeout: Duration,
    /// Maximum redirect hops followed on a single transport
    pub max_redirects: usize,
    /// Enabled transports, in preference order
    pub transports: Vec<TransportKind>,
    /// QUIC idle timeout for HTTP/3 connections
    pub quic_idle_timeout: Duration,
    pub tls: TlsConfig,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_ATTEMPT_TIMEOUT,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            transports: TransportKind::ALL.to_vec(),
            quic_idle_timeout: Duration::from_secs(30),
            tls: TlsConfig::default(),
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    #[must_use]
    pub fn with_transports(mut self, transports: impl Into<Vec<TransportKind>>) -> Self {
        self.transports = transports.into();
        self
    }

    #[must_use]
    pub fn with_native_certs(mut self, enabled: bool) -> Self {
        self.tls.use_native_certs = enabled;
        self
    }

    #[must_use]
    pub fn with_root_certificate_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.tls.extra_root_certs_pem.push(pem.into());
        self
    }

    /// Validates the configuration settings
    ///
    /// # Errors
    ///
    /// Returns a `ConfigurationError` when a timeout is zero or above one hour,
    /// the redirect limit is too large, the transport list is empty or out of
    /// preference order, or an extra root certificate holds no certificate.
    pub fn validate(&self) -> ConfigResult<()> {
        ConfigValidator::validate_timeout(self.timeout, "timeout")?;
        ConfigValidator::validate_timeout(self.quic_idle_timeout, "quic_idle_timeout")?;
        ConfigValidator::validate_at_most(self.max_redirects, MAX_REDIRECT_LIMIT, "max_redirects")?;
        ConfigValidator::validate_transport_order(&self.transports)?;

        for (index, pem) in self.tls.extra_root_certs_pem.iter().enumerate() {
            let mut reader = pem.as_slice();
            let mut found = false;
            for cert in rustls_pemfile::certs(&mut reader) {
                cert.map_err(|e| {
                    ConfigurationError::InvalidCertificate(format!("root #{index}: {e}"))
                })?;
                found = true;
            }
            if !found {
                return Err(ConfigurationError::InvalidCertificate(format!(
                    "root #{index} contains no PEM certificate"
                )));
            }
        }

        Ok(())
    }
}
