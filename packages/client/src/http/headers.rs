//! Request header set and Content-Encoding detection

use http::{HeaderMap, HeaderValue, header};

pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/15.3 Safari/605.1.15";
pub const REFERER: &str = "https://google.com";
pub const ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,application/rss+xml,application/json,*/*;q=0.8";
pub const ACCEPT_ENCODING: &str = "gzip, br";
pub const ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
pub const CONNECTION: &str = "keep-alive";

/// The fixed browser-like header set sent on every request.
///
/// `Connection` is part of the set but is connection-specific; the HTTP/2 and
/// HTTP/3 transports drop it before writing frames.
#[must_use]
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::with_capacity(6);
    headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
    headers.insert(header::REFERER, HeaderValue::from_static(REFERER));
    headers.insert(header::ACCEPT, HeaderValue::from_static(ACCEPT));
    headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static(ACCEPT_ENCODING),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE),
    );
    headers.insert(header::CONNECTION, HeaderValue::from_static(CONNECTION));
    headers
}

/// Copy of `headers` without hop-by-hop fields, for multiplexed transports.
pub(crate) fn without_connection_headers(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();
    headers.remove(header::CONNECTION);
    headers
}

/// Encoding applied to a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
    Deflate,
    Brotli,
    /// No decoding; covers an absent header and any unrecognised token
    Identity,
}

impl ContentEncoding {
    /// Parse a single Content-Encoding token, case-insensitively.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("gzip") {
            Self::Gzip
        } else if token.eq_ignore_ascii_case("deflate") {
            Self::Deflate
        } else if token.eq_ignore_ascii_case("br") || token.eq_ignore_ascii_case("brotli") {
            Self::Brotli
        } else {
            Self::Identity
        }
    }

    /// Encoding declared by a response's `Content-Encoding` header.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::CONTENT_ENCODING)
            .and_then(|value| value.to_str().ok())
            .map_or(Self::Identity, Self::from_token)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
            Self::Brotli => "br",
            Self::Identity => "identity",
        }
    }

    #[inline]
    #[must_use]
    pub fn is_identity(self) -> bool {
        self == Self::Identity
    }
}
