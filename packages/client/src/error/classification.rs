use std::error::Error as StdError;
use std::io;

use http::StatusCode;

use super::helpers::TimedOut;
use super::types::{AttemptFailure, Error, Kind};
use crate::protocols::TransportKind;

impl Error {
    /// Returns true if the target URL failed validation.
    #[must_use]
    pub fn is_invalid_target(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidTarget)
    }

    /// Returns true if every transport attempt failed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        matches!(self.inner.kind, Kind::TransportExhausted)
    }

    /// Returns true if the error is related to decoding the response's body
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self.inner.kind, Kind::Decode)
    }

    /// Returns true if relaying a raw body to a caller failed.
    #[must_use]
    pub fn is_stream_copy(&self) -> bool {
        matches!(self.inner.kind, Kind::StreamCopy)
    }

    /// Returns true if the error is from a redirect chain.
    #[must_use]
    pub fn is_redirect(&self) -> bool {
        matches!(self.inner.kind, Kind::Redirect)
    }

    /// Returns true if the error is related to a timeout.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        if matches!(self.inner.kind, Kind::Timeout) {
            return true;
        }

        let mut source = self.source();

        while let Some(err) = source {
            if err.is::<TimedOut>() {
                return true;
            }
            if let Some(io) = err.downcast_ref::<io::Error>() {
                if io.kind() == io::ErrorKind::TimedOut {
                    return true;
                }
            }
            source = err.source();
        }

        false
    }

    /// The transport the error occurred on, if it came from a single attempt.
    #[must_use]
    pub fn transport(&self) -> Option<TransportKind> {
        self.inner.transport
    }

    /// Every failed attempt in cascade order. Empty unless the cascade was exhausted.
    #[must_use]
    pub fn attempt_failures(&self) -> &[AttemptFailure] {
        &self.inner.attempts
    }

    /// The reported cause of an exhausted cascade: the final attempt's error.
    #[must_use]
    pub fn cause(&self) -> Option<&Error> {
        self.inner.attempts.last().map(|attempt| &attempt.error)
    }

    /// Status code a serving collaborator should answer with.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self.inner.kind {
            Kind::InvalidTarget => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error;

    fn failure(transport: TransportKind, message: &str) -> AttemptFailure {
        AttemptFailure {
            transport,
            error: error::connect(message.to_string()).with_transport(transport),
        }
    }

    #[test]
    fn exhausted_reports_only_last_cause() {
        let url = url::Url::parse("https://example.com/").unwrap();
        let err = error::exhausted(
            url,
            vec![
                failure(TransportKind::Http3, "quic refused"),
                failure(TransportKind::Http2, "alpn"),
                failure(TransportKind::Http1, "connection refused"),
            ],
        );

        assert!(err.is_exhausted());
        assert_eq!(err.attempt_failures().len(), 3);

        let cause = err.cause().unwrap();
        assert_eq!(cause.transport(), Some(TransportKind::Http1));
        assert_eq!(
            err.source().unwrap().to_string(),
            "error connecting to target over HTTP/1.1"
        );
        assert_eq!(
            cause.source().unwrap().to_string(),
            "connection refused"
        );
    }

    #[test]
    fn timeout_detected_through_source_chain() {
        assert!(error::timeout().is_timeout());

        let io = io::Error::new(io::ErrorKind::TimedOut, "read timed out");
        assert!(error::body(io).is_timeout());
        assert!(!error::body("eof").is_timeout());
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            error::invalid_target("url is invalid").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error::decode("bad gzip header").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn transport_is_set_once() {
        let err = error::timeout()
            .with_transport(TransportKind::Http2)
            .with_transport(TransportKind::Http1);
        assert_eq!(err.transport(), Some(TransportKind::Http2));
        assert_eq!(err.to_string(), "request timeout over HTTP/2");
    }
}
