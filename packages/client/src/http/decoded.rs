//! Decoded body streams
//!
//! A `DecodedStream` owns two resources: the decompressor and the network body
//! beneath it. Teardown always runs in that order, decoder first, whether the
//! stream was read to the end, abandoned early, or failed.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::stream::{Stream, StreamExt};
use http::{HeaderMap, StatusCode, Version, header};
use url::Url;

use crate::Result;
use crate::error;
use crate::http::body::ResponseBody;
use crate::http::compression::{Decompress, decoder_for};
use crate::http::headers::ContentEncoding;
use crate::http::response::FetchResult;
use crate::protocols::TransportKind;

/// Uncompressed view over a response body.
pub struct DecodedStream {
    body: Option<ResponseBody>,
    codec: Option<Box<dyn Decompress>>,
    pending: Option<Bytes>,
    done: bool,
}

impl DecodedStream {
    /// Wrap `body` in `codec`, or pass it through untouched when `codec` is
    /// `None`.
    ///
    /// A codec is primed with body chunks until it produces output, so a body
    /// that does not match its declared encoding fails here, before any byte
    /// is delivered, however the first bytes were split on the wire.
    ///
    /// # Errors
    ///
    /// Returns a decode error for a corrupt stream, or the body's own error if
    /// the first read fails. Both resources are released before returning.
    pub async fn open(body: ResponseBody, codec: Option<Box<dyn Decompress>>) -> Result<Self> {
        let mut stream = Self {
            body: Some(body),
            codec,
            pending: None,
            done: false,
        };

        if stream.codec.is_some() {
            stream.prime().await?;
        }

        Ok(stream)
    }

    /// Select a codec from `encoding` and open the stream.
    ///
    /// # Errors
    ///
    /// See [`DecodedStream::open`].
    pub async fn with_encoding(body: ResponseBody, encoding: ContentEncoding) -> Result<Self> {
        Self::open(body, decoder_for(encoding)).await
    }

    async fn prime(&mut self) -> Result<()> {
        loop {
            let Some(body) = self.body.as_mut() else {
                return Ok(());
            };
            let Some(codec) = self.codec.as_mut() else {
                return Ok(());
            };

            match body.next().await {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => match codec.decompress(&chunk) {
                    // header still incomplete
                    Ok(out) if out.is_empty() => continue,
                    Ok(out) => {
                        self.pending = Some(out);
                        return Ok(());
                    }
                    Err(e) => {
                        let encoding = codec.encoding();
                        self.teardown();
                        tracing::debug!(
                            target: "trifetch::decode",
                            encoding = encoding.name(),
                            error = %e,
                            "body does not match declared encoding"
                        );
                        return Err(error::decode(e));
                    }
                },
                Some(Err(e)) => {
                    self.teardown();
                    return Err(e);
                }
                None => {
                    self.done = true;
                    return match codec.finish() {
                        Ok(out) => {
                            self.pending = Some(out);
                            Ok(())
                        }
                        Err(e) => {
                            self.teardown();
                            Err(error::decode(e))
                        }
                    };
                }
            }
        }
    }

    /// Encoding being removed, `Identity` for passthrough.
    #[must_use]
    pub fn encoding(&self) -> ContentEncoding {
        self.codec
            .as_ref()
            .map_or(ContentEncoding::Identity, |codec| codec.encoding())
    }

    /// Read the remaining decoded bytes into memory, then release.
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buf.extend_from_slice(&chunk?);
        }
        self.release();
        Ok(buf.freeze())
    }

    /// Finalize the decoder, then close the network body.
    pub fn release(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        self.done = true;
        self.pending = None;
        if let Some(codec) = self.codec.take() {
            codec.release();
        }
        if let Some(body) = self.body.take() {
            body.close();
        }
    }
}

impl Stream for DecodedStream {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        if let Some(out) = this.pending.take() {
            if !out.is_empty() {
                return Poll::Ready(Some(Ok(out)));
            }
        }

        if this.done {
            return Poll::Ready(None);
        }

        loop {
            let Some(body) = this.body.as_mut() else {
                return Poll::Ready(None);
            };

            let next = match body.poll_next_unpin(cx) {
                Poll::Ready(next) => next,
                Poll::Pending => return Poll::Pending,
            };

            match next {
                Some(Ok(chunk)) if chunk.is_empty() => continue,
                Some(Ok(chunk)) => {
                    let Some(codec) = this.codec.as_mut() else {
                        return Poll::Ready(Some(Ok(chunk)));
                    };
                    match codec.decompress(&chunk) {
                        Ok(out) if out.is_empty() => continue,
                        Ok(out) => return Poll::Ready(Some(Ok(out))),
                        Err(e) => {
                            this.done = true;
                            return Poll::Ready(Some(Err(error::decode(e))));
                        }
                    }
                }
                Some(Err(e)) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
                None => {
                    this.done = true;
                    let Some(codec) = this.codec.as_mut() else {
                        return Poll::Ready(None);
                    };
                    return match codec.finish() {
                        Ok(out) if out.is_empty() => Poll::Ready(None),
                        Ok(out) => Poll::Ready(Some(Ok(out))),
                        Err(e) => Poll::Ready(Some(Err(error::decode(e)))),
                    };
                }
            }
        }
    }
}

impl Drop for DecodedStream {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for DecodedStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedStream")
            .field("encoding", &self.encoding())
            .field("done", &self.done)
            .finish()
    }
}

/// A response whose body has been wrapped in its decoder.
///
/// `Content-Encoding` is absent from `headers`.
#[derive(Debug)]
pub struct DecodedResponse {
    status: StatusCode,
    version: Version,
    url: Url,
    headers: HeaderMap,
    transport: TransportKind,
    stream: DecodedStream,
}

impl DecodedResponse {
    pub(crate) async fn from_fetch(result: FetchResult) -> Result<Self> {
        let version = result.version();
        let transport = result.transport();
        let url = result.url().clone();
        let (status, mut headers, body) = result.into_parts();

        let encoding = ContentEncoding::from_headers(&headers);
        headers.remove(header::CONTENT_ENCODING);

        let stream = DecodedStream::with_encoding(body, encoding)
            .await
            .map_err(|e| if e.url().is_none() { e.with_url(url.clone()) } else { e })?;

        Ok(Self {
            status,
            version,
            url,
            headers,
            transport,
            stream,
        })
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn transport(&self) -> TransportKind {
        self.transport
    }

    pub fn stream_mut(&mut self) -> &mut DecodedStream {
        &mut self.stream
    }

    #[must_use]
    pub fn into_stream(self) -> DecodedStream {
        self.stream
    }

    /// Read the whole decoded body, then release it.
    pub async fn bytes(self) -> Result<Bytes> {
        self.stream.bytes().await
    }
}
