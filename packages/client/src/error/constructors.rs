use super::types::{AttemptFailure, Error, Kind};

pub(crate) type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Creates an `Error` for an invalid configuration.
pub fn builder<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Builder).with(e.into())
}

/// Creates an `Error` for a target that failed validation.
pub fn invalid_target<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::InvalidTarget).with(e.into())
}

/// Creates an `Error` for a connect or handshake failure.
pub fn connect<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Connect).with(e.into())
}

/// Creates an `Error` for a TLS failure.
pub fn tls<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Tls).with(e.into())
}

/// Creates an `Error` for an attempt that ran past its deadline.
pub fn timeout() -> Error {
    Error::new(Kind::Timeout).with(super::helpers::TimedOut)
}

/// Creates an `Error` for a request error.
pub fn request<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Request).with(e.into())
}

/// Creates an `Error` for a body error.
pub fn body<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Body).with(e.into())
}

/// Creates an `Error` for a redirect error.
pub fn redirect<E: Into<BoxError>>(e: E, url: url::Url) -> Error {
    Error::new(Kind::Redirect).with(e.into()).with_url(url)
}

/// Creates an `Error` for a decode error.
pub fn decode<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Decode).with(e.into())
}

/// Creates the error returned once every transport has failed.
pub fn exhausted(url: url::Url, attempts: Vec<AttemptFailure>) -> Error {
    Error::new(Kind::TransportExhausted)
        .with_url(url)
        .with_attempts(attempts)
}

/// Creates an `Error` for a failed passthrough copy.
pub fn stream_copy<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::StreamCopy).with(e.into())
}

/// Creates an `Error` for an extraction collaborator failure.
pub fn extraction<E: Into<BoxError>>(e: E) -> Error {
    Error::new(Kind::Extraction).with(e.into())
}
