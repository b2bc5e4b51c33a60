//! HTTP/1.1 strategy
//!
//! Plain TCP for `http` targets, TLS with ALPN `http/1.1` for `https`. One
//! connection per request, driven by a spawned task owned by the body.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::StreamExt;
use http::{HeaderValue, header};
use http_body_util::{BodyStream, Empty};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_rustls::TlsConnector;
use url::Position;

use crate::Result;
use crate::error::{self, UnsupportedScheme};
use crate::http::{FetchResult, ResponseBody};
use crate::protocols::connection::{ConnectionTask, connect_tcp};
use crate::protocols::core::{FetchRequest, TransportKind};
use crate::protocols::strategy_trait::Transport;
use crate::tls::{self, TlsManager};

const KIND: TransportKind = TransportKind::Http1;

/// HTTP/1.1 transport.
#[derive(Clone)]
pub struct H1Transport {
    tls: TlsConnector,
}

impl H1Transport {
    /// # Errors
    ///
    /// Returns a TLS error if the client configuration cannot be built.
    pub fn new(tls: &TlsManager) -> Result<Self> {
        Ok(Self {
            tls: tls.connector(KIND)?,
        })
    }

    async fn execute(&self, request: &FetchRequest) -> Result<FetchResult> {
        match request.url().scheme() {
            "http" => exchange(connect_tcp(request).await?, request).await,
            "https" => {
                let tcp = connect_tcp(request).await?;
                let stream = tls::handshake(&self.tls, tcp, request.host()?, KIND).await?;
                exchange(stream, request).await
            }
            other => Err(error::request(UnsupportedScheme(other.to_string()))
                .with_url(request.url().clone())),
        }
    }
}

/// Request line target: path and query, no fragment.
fn origin_form(request: &FetchRequest) -> &str {
    &request.url()[Position::BeforePath..Position::AfterQuery]
}

/// Host header value: host and any explicit port.
fn host_header(request: &FetchRequest) -> Result<HeaderValue> {
    let authority = &request.url()[Position::BeforeHost..Position::AfterPort];
    HeaderValue::from_str(authority).map_err(error::request)
}

async fn exchange<T>(io: T, request: &FetchRequest) -> Result<FetchResult>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(io))
        .await
        .map_err(error::connect)?;

    let task = ConnectionTask::spawn(KIND, async move {
        if let Err(e) = conn.await {
            tracing::debug!(target: "trifetch::h1", error = %e, "connection closed with error");
        }
    });

    let mut outbound = http::Request::builder()
        .method(request.method())
        .uri(origin_form(request))
        .body(Empty::<Bytes>::new())
        .map_err(error::request)?;
    *outbound.headers_mut() = request.headers().clone();
    outbound
        .headers_mut()
        .insert(header::HOST, host_header(request)?);

    let response = sender
        .send_request(outbound)
        .await
        .map_err(error::request)?;

    let (parts, incoming) = response.into_parts();
    tracing::trace!(
        target: "trifetch::h1",
        status = parts.status.as_u16(),
        url = %request.url(),
        "response headers received"
    );

    let chunks = BodyStream::new(incoming).filter_map(|frame| async move {
        match frame {
            Ok(frame) => frame.into_data().ok().map(Ok),
            Err(e) => Some(Err(error::body(e))),
        }
    });

    let body = ResponseBody::new(chunks).on_close(move || {
        drop(sender);
        drop(task);
    });

    Ok(FetchResult::new(
        KIND,
        request.url().clone(),
        parts.status,
        parts.headers,
        body,
    ))
}

impl Transport for H1Transport {
    fn kind(&self) -> TransportKind {
        KIND
    }

    fn send<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<FetchResult>> {
        Box::pin(self.execute(request))
    }
}

impl std::fmt::Debug for H1Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("H1Transport").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    #[test]
    fn request_line_and_host() {
        let request = FetchRequest::new(
            Url::parse("http://example.com:8080/a/b?c=d#frag").unwrap(),
        );
        assert_eq!(origin_form(&request), "/a/b?c=d");
        assert_eq!(host_header(&request).unwrap(), "example.com:8080");

        let request = FetchRequest::new(Url::parse("https://example.com").unwrap());
        assert_eq!(origin_form(&request), "/");
        assert_eq!(host_header(&request).unwrap(), "example.com");
    }
}
