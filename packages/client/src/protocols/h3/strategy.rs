//! H3 protocol strategy
//!
//! Each request gets its own QUIC connection on a shared, lazily bound UDP
//! endpoint. The HTTP/3 connection driver runs in a spawned task that the
//! response body owns.

use bytes::{Buf, Bytes};
use futures::future::{BoxFuture, poll_fn};
use futures::stream;
use h3::client::RequestStream;
use h3_quinn::BidiStream;
use quinn::{Endpoint, VarInt};
use tokio::sync::OnceCell;

use super::endpoint;
use crate::Result;
use crate::config::FetchConfig;
use crate::error;
use crate::http::headers::without_connection_headers;
use crate::http::{FetchResult, ResponseBody};
use crate::protocols::connection::ConnectionTask;
use crate::protocols::core::{FetchRequest, TransportKind};
use crate::protocols::strategy_trait::Transport;
use crate::tls::TlsManager;

const KIND: TransportKind = TransportKind::Http3;

/// H3_NO_ERROR application close code.
const H3_NO_ERROR: u32 = 0x100;

/// HTTP/3 transport over QUIC.
pub struct H3Transport {
    client_config: quinn::ClientConfig,
    endpoint: OnceCell<Endpoint>,
}

impl H3Transport {
    /// # Errors
    ///
    /// Returns a TLS or builder error if the QUIC client configuration is
    /// rejected.
    pub fn new(tls: &TlsManager, config: &FetchConfig) -> Result<Self> {
        let client_config =
            endpoint::client_config(tls.client_config(KIND)?, config.quic_idle_timeout)?;

        Ok(Self {
            client_config,
            endpoint: OnceCell::new(),
        })
    }

    async fn endpoint(&self) -> Result<&Endpoint> {
        self.endpoint
            .get_or_try_init(|| async { endpoint::bind() })
            .await
    }

    async fn execute(&self, request: &FetchRequest) -> Result<FetchResult> {
        request.require_https(KIND)?;

        let host = request.host()?;
        let port = request.port()?;
        let endpoint = self.endpoint().await?;

        let ipv4_only = endpoint
            .local_addr()
            .map(|addr| addr.is_ipv4())
            .unwrap_or(false);
        let addrs = tokio::net::lookup_host((host, port))
            .await
            .map_err(|e| error::connect(e).with_url(request.url().clone()))?;
        let addr = endpoint::pick_address(addrs, ipv4_only)
            .ok_or_else(|| error::connect(format!("no usable address for {host}")))?;

        let quic = endpoint
            .connect_with(self.client_config.clone(), addr, host)
            .map_err(error::connect)?
            .await
            .map_err(error::connect)?;

        tracing::trace!(
            target: "trifetch::h3",
            remote = %addr,
            url = %request.url(),
            "QUIC connection established"
        );

        let (mut driver, mut sender) = h3::client::new(h3_quinn::Connection::new(quic.clone()))
            .await
            .map_err(error::connect)?;

        let task = ConnectionTask::spawn(KIND, async move {
            let closed = poll_fn(|cx| driver.poll_close(cx)).await;
            tracing::trace!(target: "trifetch::h3", outcome = ?closed, "connection driver finished");
        });

        let mut outbound = http::Request::builder()
            .method(request.method())
            .uri(request.absolute_form())
            .version(http::Version::HTTP_3)
            .body(())
            .map_err(error::request)?;
        *outbound.headers_mut() = without_connection_headers(request.headers());

        let mut stream = sender
            .send_request(outbound)
            .await
            .map_err(error::request)?;
        stream.finish().await.map_err(error::request)?;

        let response = stream.recv_response().await.map_err(error::request)?;
        let (parts, ()) = response.into_parts();

        tracing::trace!(
            target: "trifetch::h3",
            status = parts.status.as_u16(),
            url = %request.url(),
            "response headers received"
        );

        let body = ResponseBody::new(data_frames(stream)).on_close(move || {
            drop(sender);
            drop(task);
            quic.close(VarInt::from_u32(H3_NO_ERROR), b"");
        });

        Ok(FetchResult::new(
            KIND,
            request.url().clone(),
            parts.status,
            parts.headers,
            body,
        ))
    }
}

type ResponseStream = RequestStream<BidiStream<Bytes>, Bytes>;

fn data_frames(stream: ResponseStream) -> impl futures::Stream<Item = Result<Bytes>> + Send {
    stream::unfold(Some(stream), |stream| async move {
        let mut stream = stream?;
        match stream.recv_data().await {
            Ok(Some(mut chunk)) => {
                let bytes = chunk.copy_to_bytes(chunk.remaining());
                Some((Ok(bytes), Some(stream)))
            }
            Ok(None) => None,
            Err(e) => Some((Err(error::body(e)), None)),
        }
    })
}

impl Transport for H3Transport {
    fn kind(&self) -> TransportKind {
        KIND
    }

    fn send<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<FetchResult>> {
        Box::pin(self.execute(request))
    }
}

impl std::fmt::Debug for H3Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("H3Transport")
            .field("endpoint_bound", &self.endpoint.initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;

    #[tokio::test]
    async fn plain_http_fails_before_binding() {
        let config = FetchConfig::default().with_native_certs(false);
        let manager = TlsManager::new(&config.tls).unwrap();
        let transport = H3Transport::new(&manager, &config).unwrap();
        let request = FetchRequest::new(Url::parse("http://127.0.0.1:9/").unwrap());

        let err = transport.send(&request).await.unwrap_err();
        assert_eq!(err.transport(), Some(TransportKind::Http3));
        assert!(!transport.endpoint.initialized());
    }
}
