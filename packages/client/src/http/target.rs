//! Inbound target validation

use std::fmt;

use url::Url;

use crate::Result;
use crate::error;

/// Shortest raw target accepted before parsing.
const MIN_TARGET_LEN: usize = 5;

#[derive(Debug)]
enum Rejection {
    Missing,
    TooShort(usize),
    NotAbsolute(url::ParseError),
    NoHost,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Missing => f.write_str("missing url"),
            Rejection::TooShort(len) => write!(f, "url too short ({len} characters)"),
            Rejection::NotAbsolute(e) => write!(f, "not an absolute uri: {e}"),
            Rejection::NoHost => f.write_str("absolute uri has no host"),
        }
    }
}

impl std::error::Error for Rejection {}

/// A target URL that passed validation and can be handed to the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTarget {
    raw: String,
    url: Url,
}

impl FetchTarget {
    /// Validate a raw inbound target.
    ///
    /// # Errors
    ///
    /// Returns an `InvalidTarget` error when `raw` is empty, shorter than five
    /// characters, or not an absolute URI with a host.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(error::invalid_target(Rejection::Missing));
        }
        if trimmed.len() < MIN_TARGET_LEN {
            return Err(error::invalid_target(Rejection::TooShort(trimmed.len())));
        }

        let url = Url::parse(trimmed)
            .map_err(|e| error::invalid_target(Rejection::NotAbsolute(e)))?;
        if !url.has_host() {
            return Err(error::invalid_target(Rejection::NoHost).with_url(url));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            url,
        })
    }

    /// The target exactly as supplied, minus surrounding whitespace.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    #[must_use]
    pub fn into_url(self) -> Url {
        self.url
    }
}
