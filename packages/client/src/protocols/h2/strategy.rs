//! H2 protocol strategy
//!
//! Opens a TLS connection that must negotiate `h2`, performs the HTTP/2
//! handshake, sends a single GET stream with END_STREAM set on the headers
//! frame, and exposes the response DATA frames as the body.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream;
use h2::RecvStream;
use tokio_rustls::TlsConnector;

use crate::Result;
use crate::error;
use crate::http::headers::without_connection_headers;
use crate::http::{FetchResult, ResponseBody};
use crate::protocols::connection::{ConnectionTask, connect_tcp};
use crate::protocols::core::{FetchRequest, TransportKind};
use crate::protocols::strategy_trait::Transport;
use crate::tls::{self, TlsManager};

const KIND: TransportKind = TransportKind::Http2;

/// HTTP/2 transport using explicit ALPN `h2`.
#[derive(Clone)]
pub struct H2Transport {
    tls: TlsConnector,
}

impl H2Transport {
    /// # Errors
    ///
    /// Returns a TLS error if the client configuration cannot be built.
    pub fn new(tls: &TlsManager) -> Result<Self> {
        Ok(Self {
            tls: tls.connector(KIND)?,
        })
    }

    async fn execute(&self, request: &FetchRequest) -> Result<FetchResult> {
        request.require_https(KIND)?;

        let tcp = connect_tcp(request).await?;
        let tls_stream = tls::handshake(&self.tls, tcp, request.host()?, KIND).await?;

        let (client, connection) = h2::client::handshake(tls_stream)
            .await
            .map_err(error::connect)?;

        let task = ConnectionTask::spawn(KIND, async move {
            if let Err(e) = connection.await {
                tracing::debug!(target: "trifetch::h2", error = %e, "connection closed with error");
            }
        });

        let mut client = client.ready().await.map_err(error::request)?;

        let mut outbound = http::Request::builder()
            .method(request.method())
            .uri(request.absolute_form())
            .version(http::Version::HTTP_2)
            .body(())
            .map_err(error::request)?;
        *outbound.headers_mut() = without_connection_headers(request.headers());

        let (response, _send_stream) = client
            .send_request(outbound, true)
            .map_err(error::request)?;

        let response = response.await.map_err(error::request)?;
        let (parts, recv) = response.into_parts();

        tracing::trace!(
            target: "trifetch::h2",
            status = parts.status.as_u16(),
            url = %request.url(),
            "response headers received"
        );

        let body = ResponseBody::new(data_frames(recv)).on_close(move || {
            drop(client);
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
}

/// DATA frames of a response stream, releasing flow-control capacity as each
/// frame is handed on.
fn data_frames(recv: RecvStream) -> impl futures::Stream<Item = Result<Bytes>> + Send {
    stream::unfold(Some(recv), |recv| async move {
        let mut recv = recv?;
        match recv.data().await? {
            Ok(chunk) => {
                let _ = recv.flow_control().release_capacity(chunk.len());
                Some((Ok(chunk), Some(recv)))
            }
            Err(e) => Some((Err(error::body(e)), None)),
        }
    })
}

impl Transport for H2Transport {
    fn kind(&self) -> TransportKind {
        KIND
    }

    fn send<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<FetchResult>> {
        Box::pin(self.execute(request))
    }
}

impl std::fmt::Debug for H2Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("H2Transport").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::*;
    use crate::config::TlsConfig;

    #[tokio::test]
    async fn plain_http_fails_without_connecting() {
        let manager = TlsManager::new(&TlsConfig {
            use_native_certs: false,
            extra_root_certs_pem: Vec::new(),
        })
        .unwrap();
        let transport = H2Transport::new(&manager).unwrap();
        let request = FetchRequest::new(Url::parse("http://127.0.0.1:9/").unwrap());

        let err = transport.send(&request).await.unwrap_err();
        assert_eq!(err.transport(), Some(TransportKind::Http2));
        assert!(err.to_string().starts_with("error sending request"));
    }
}
