//! Live responses returned by the cascade

use http::{HeaderMap, StatusCode, Version};
use url::Url;

use crate::Result;
use crate::http::body::ResponseBody;
use crate::http::decoded::DecodedResponse;
use crate::protocols::TransportKind;

/// A response from the first transport that succeeded, body still open.
///
/// The receiver owns the body; it is released exactly once, either through
/// `ResponseBody::close`, a `DecodedStream`, or on drop.
#[derive(Debug)]
pub struct FetchResult {
    status: StatusCode,
    version: Version,
    url: Url,
    headers: HeaderMap,
    body: ResponseBody,
    transport: TransportKind,
}

impl FetchResult {
    pub fn new(
        transport: TransportKind,
        url: Url,
        status: StatusCode,
        headers: HeaderMap,
        body: ResponseBody,
    ) -> Self {
        Self {
            status,
            version: transport.version(),
            url,
            headers,
            body,
            transport,
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// URL of the final hop after redirects.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Transport that produced this response.
    #[must_use]
    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    pub fn body_mut(&mut self) -> &mut ResponseBody {
        &mut self.body
    }

    #[must_use]
    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    #[must_use]
    pub fn into_parts(self) -> (StatusCode, HeaderMap, ResponseBody) {
        (self.status, self.headers, self.body)
    }

    /// Wrap the body in the decoder its `Content-Encoding` selects.
    ///
    /// # Errors
    ///
    /// Returns a decode error when the body does not match the declared
    /// encoding. The body is released before returning.
    pub async fn decode(self) -> Result<DecodedResponse> {
        DecodedResponse::from_fetch(self).await
    }

    pub(crate) fn set_deadline(&mut self, deadline: tokio::time::Instant) {
        self.body.set_deadline(deadline);
    }
}
