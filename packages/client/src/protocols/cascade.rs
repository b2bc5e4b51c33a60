//! Transport cascade
//!
//! Tries each enabled transport in preference order, HTTP/3 then HTTP/2 then
//! HTTP/1.1, and returns the first response. Attempts are strictly sequential:
//! a failed attempt's connection is gone before the next one starts, and
//! nothing is retried on the same transport.

use std::sync::Arc;

use tokio::time::Instant;
use url::Url;

use super::core::{FetchRequest, TransportKind};
use super::h1::H1Transport;
use super::h2::H2Transport;
use super::h3::H3Transport;
use super::redirect;
use super::strategy_trait::Transport;
use crate::Result;
use crate::config::FetchConfig;
use crate::error::{self, AttemptFailure};
use crate::http::FetchResult;
use crate::tls::TlsManager;

/// Ordered fallback across transports.
///
/// Built once and shared; the transports hold only read-mostly state (TLS
/// configuration and the QUIC endpoint), never pooled connections.
pub struct Cascade {
    transports: Vec<Arc<dyn Transport>>,
    config: Arc<FetchConfig>,
}

impl Cascade {
    /// Build the transports enabled in `config`.
    ///
    /// # Errors
    ///
    /// Returns a builder error if the configuration is invalid, or a TLS error
    /// if the trust store or a client configuration cannot be built.
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate().map_err(error::builder)?;
        let tls = TlsManager::new(&config.tls)?;

        let mut transports: Vec<Arc<dyn Transport>> = Vec::with_capacity(config.transports.len());
        for kind in &config.transports {
            let transport: Arc<dyn Transport> = match kind {
                TransportKind::Http3 => Arc::new(H3Transport::new(&tls, &config)?),
                TransportKind::Http2 => Arc::new(H2Transport::new(&tls)?),
                TransportKind::Http1 => Arc::new(H1Transport::new(&tls)?),
            };
            transports.push(transport);
        }

        tracing::debug!(
            target: "trifetch::cascade",
            transports = ?config.transports,
            roots = tls.root_count(),
            "cascade ready"
        );

        Ok(Self {
            transports,
            config: Arc::new(config),
        })
    }

    /// Use caller-supplied transports, tried in the order given.
    ///
    /// `config.transports` is replaced by the kinds of `transports`, so
    /// [`Cascade::config`] always reports what actually runs.
    ///
    /// # Errors
    ///
    /// Returns a builder error if the configuration is invalid or no
    /// transport is supplied.
    pub fn with_transports(
        mut config: FetchConfig,
        transports: Vec<Arc<dyn Transport>>,
    ) -> Result<Self> {
        config.validate().map_err(error::builder)?;
        if transports.is_empty() {
            return Err(error::builder("at least one transport is required"));
        }
        config.transports = transports.iter().map(|transport| transport.kind()).collect();

        Ok(Self {
            transports,
            config: Arc::new(config),
        })
    }

    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Transports in the order they are attempted.
    pub fn transports(&self) -> impl Iterator<Item = TransportKind> + '_ {
        self.transports.iter().map(|transport| transport.kind())
    }

    /// Fetch `url`, falling back across transports.
    ///
    /// Each attempt, redirects included, must produce response headers within
    /// the configured timeout. The body of the winning response keeps the same
    /// deadline.
    ///
    /// # Errors
    ///
    /// Returns a `TransportExhausted` error once every transport has failed.
    /// Its reported cause is the last attempt's error; all attempt failures
    /// are available through `Error::attempt_failures`.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult> {
        let request = FetchRequest::new(url.clone());
        let mut failures = Vec::with_capacity(self.transports.len());

        for transport in &self.transports {
            let kind = transport.kind();
            let deadline = Instant::now() + self.config.timeout;
            let attempt = redirect::follow(transport.as_ref(), &request, self.config.max_redirects);

            let outcome = match tokio::time::timeout_at(deadline, attempt).await {
                Ok(outcome) => outcome,
                Err(_elapsed) => Err(error::timeout()),
            };

            match outcome {
                Ok(mut result) => {
                    result.set_deadline(deadline);
                    tracing::info!(
                        target: "trifetch::cascade",
                        transport = %kind,
                        url = %url,
                        status = result.status().as_u16(),
                        "fetched"
                    );
                    return Ok(result);
                }
                Err(err) => {
                    let err = if err.url().is_some() {
                        err.with_transport(kind)
                    } else {
                        err.with_transport(kind).with_url(url.clone())
                    };
                    tracing::debug!(
                        target: "trifetch::cascade",
                        transport = %kind,
                        url = %url,
                        error = %err,
                        "attempt failed"
                    );
                    failures.push(AttemptFailure {
                        transport: kind,
                        error: err,
                    });
                }
            }
        }

        let err = error::exhausted(url.clone(), failures);
        tracing::warn!(
            target: "trifetch::cascade",
            url = %url,
            attempts = err.attempt_failures().len(),
            cause = ?err.cause().map(ToString::to_string),
            "all transports failed"
        );
        Err(err)
    }
}

impl std::fmt::Debug for Cascade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cascade")
            .field("transports", &self.transports().collect::<Vec<_>>())
            .field("timeout", &self.config.timeout)
            .finish()
    }
}
