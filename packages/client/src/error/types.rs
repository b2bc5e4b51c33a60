use std::error::Error as StdError;
use std::fmt;

use crate::protocols::TransportKind;

/// A Result alias where the Err case is `trifetch_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors that can occur while fetching and decoding a target.
pub struct Error {
    pub(crate) inner: Box<Inner>,
}

pub(crate) struct Inner {
    pub(crate) kind: Kind,
    pub(crate) source: Option<Box<dyn StdError + Send + Sync>>,
    pub(crate) url: Option<url::Url>,
    pub(crate) transport: Option<TransportKind>,
    pub(crate) attempts: Vec<AttemptFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Invalid configuration handed to a builder
    Builder,
    /// Target URL missing, too short, or not an absolute URI
    InvalidTarget,
    /// TCP/UDP connect or QUIC/HTTP handshake failure
    Connect,
    /// Certificate verification or TLS handshake failure
    Tls,
    /// Attempt exceeded its deadline
    Timeout,
    /// Failure sending the request or receiving response headers
    Request,
    /// Failure reading the response body
    Body,
    /// Redirect chain could not be followed
    Redirect,
    /// Declared Content-Encoding does not match the body
    Decode,
    /// Every transport attempt failed
    TransportExhausted,
    /// Relaying bytes to a caller failed after headers were committed
    StreamCopy,
    /// Article extraction collaborator failed
    Extraction,
}

/// One failed transport attempt, kept for diagnostics after exhaustion.
#[derive(Debug)]
pub struct AttemptFailure {
    pub transport: TransportKind,
    pub error: Error,
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner {
                kind,
                source: None,
                url: None,
                transport: None,
                attempts: Vec::new(),
            }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: url::Url) -> Self {
        self.inner.url = Some(url);
        self
    }

    #[must_use]
    pub fn with_transport(mut self, transport: TransportKind) -> Self {
        if self.inner.transport.is_none() {
            self.inner.transport = Some(transport);
        }
        self
    }

    pub(crate) fn with_attempts(mut self, attempts: Vec<AttemptFailure>) -> Self {
        self.inner.attempts = attempts;
        self
    }

    #[must_use]
    pub fn kind(&self) -> Kind {
        self.inner.kind
    }

    /// Get the URL associated with this error, if any
    #[must_use]
    pub fn url(&self) -> Option<&url::Url> {
        self.inner.url.as_ref()
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("trifetch::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        if let Some(ref url) = self.inner.url {
            f.field("url", &url.as_str());
        }

        if let Some(transport) = self.inner.transport {
            f.field("transport", &transport);
        }

        if !self.inner.attempts.is_empty() {
            f.field("attempts", &self.inner.attempts);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.kind {
            Kind::Builder => f.write_str("builder error")?,
            Kind::InvalidTarget => f.write_str("url is invalid")?,
            Kind::Connect => f.write_str("error connecting to target")?,
            Kind::Tls => f.write_str("tls error")?,
            Kind::Timeout => f.write_str("request timeout")?,
            Kind::Request => f.write_str("error sending request")?,
            Kind::Body => f.write_str("response body error")?,
            Kind::Redirect => f.write_str("error following redirect")?,
            Kind::Decode => f.write_str("error decoding response body")?,
            Kind::TransportExhausted => f.write_str("failed to fetch")?,
            Kind::StreamCopy => f.write_str("error copying response body")?,
            Kind::Extraction => f.write_str("article extraction failed")?,
        }

        if let Some(transport) = self.inner.transport {
            write!(f, " over {transport}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        // exhaustion reports only the final attempt's cause
        if self.inner.kind == Kind::TransportExhausted {
            return self
                .inner
                .attempts
                .last()
                .map(|attempt| &attempt.error as &(dyn StdError + 'static));
        }

        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}
