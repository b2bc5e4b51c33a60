//! Core transport types
//!
//! The three transports a `Cascade` can attempt and the immutable request
//! every attempt sends.

use std::fmt;

use http::{HeaderMap, Method};
use url::{Position, Url};

use crate::http::headers::browser_headers;

/// Transports in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Http3,
    Http2,
    Http1,
}

impl TransportKind {
    /// Every transport, most preferred first.
    pub const ALL: [TransportKind; 3] = [Self::Http3, Self::Http2, Self::Http1];

    /// Position in the fallback order; lower is tried first.
    #[must_use]
    pub const fn preference(self) -> u8 {
        match self {
            Self::Http3 => 0,
            Self::Http2 => 1,
            Self::Http1 => 2,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Http3 => "HTTP/3",
            Self::Http2 => "HTTP/2",
            Self::Http1 => "HTTP/1.1",
        }
    }

    /// ALPN protocol id offered during the TLS handshake.
    #[must_use]
    pub const fn alpn(self) -> &'static [u8] {
        match self {
            Self::Http3 => b"h3",
            Self::Http2 => b"h2",
            Self::Http1 => b"http/1.1",
        }
    }

    #[must_use]
    pub const fn version(self) -> http::Version {
        match self {
            Self::Http3 => http::Version::HTTP_3,
            Self::Http2 => http::Version::HTTP_2,
            Self::Http1 => http::Version::HTTP_11,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An outbound GET with the fixed browser header set.
///
/// The header set is identical for every request, every transport attempt and
/// every redirect hop; only the URL changes.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    url: Url,
    headers: HeaderMap,
}

impl FetchRequest {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            url,
            headers: browser_headers(),
        }
    }

    #[must_use]
    pub fn method(&self) -> Method {
        Method::GET
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Target without its fragment, as sent in HTTP/2 and HTTP/3 pseudo-headers.
    pub(crate) fn absolute_form(&self) -> &str {
        &self.url[..Position::AfterQuery]
    }

    /// Same request aimed at a redirect target.
    #[must_use]
    pub fn redirected_to(&self, url: Url) -> Self {
        Self {
            url,
            headers: self.headers.clone(),
        }
    }

    /// Host for socket addressing and SNI; IPv6 literals lose their brackets.
    pub(crate) fn host(&self) -> crate::Result<&str> {
        self.url
            .host_str()
            .map(|host| host.trim_start_matches('[').trim_end_matches(']'))
            .ok_or_else(|| crate::error::request("target has no host").with_url(self.url.clone()))
    }

    pub(crate) fn port(&self) -> crate::Result<u16> {
        self.url
            .port_or_known_default()
            .ok_or_else(|| crate::error::request("target has no port").with_url(self.url.clone()))
    }

    pub(crate) fn require_https(&self, transport: TransportKind) -> crate::Result<()> {
        if self.url.scheme() == "https" {
            Ok(())
        } else {
            Err(crate::error::request(crate::error::UnsupportedScheme(
                self.url.scheme().to_string(),
            ))
            .with_url(self.url.clone())
            .with_transport(transport))
        }
    }
}
