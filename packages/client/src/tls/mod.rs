//! TLS trust and connector setup
//!
//! Every transport verifies server certificates. There is no switch to turn
//! verification off.

use std::sync::Arc;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;

use crate::config::TlsConfig;
use crate::error::{self, AlpnRejected};
use crate::protocols::TransportKind;
use crate::Result;

/// Root store shared by all transports of a cascade.
#[derive(Clone)]
pub struct TlsManager {
    roots: Arc<RootCertStore>,
}

impl TlsManager {
    /// Build the root store: webpki roots, native roots when enabled, then
    /// any extra PEM roots from configuration.
    ///
    /// # Errors
    ///
    /// Returns a TLS error if an extra root cannot be parsed or added.
    pub fn new(config: &TlsConfig) -> Result<Self> {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

        if config.use_native_certs {
            let native = rustls_native_certs::load_native_certs();
            for err in &native.errors {
                tracing::warn!(target: "trifetch::tls", error = %err, "native certificate load error");
            }
            let (added, ignored) = roots.add_parsable_certificates(native.certs);
            tracing::debug!(
                target: "trifetch::tls",
                added,
                ignored,
                "loaded native root certificates"
            );
        }

        for pem in &config.extra_root_certs_pem {
            let mut reader = pem.as_slice();
            for cert in rustls_pemfile::certs(&mut reader) {
                let cert = cert.map_err(error::tls)?;
                roots.add(cert).map_err(error::tls)?;
            }
        }

        Ok(Self {
            roots: Arc::new(roots),
        })
    }

    #[must_use]
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    /// Client configuration offering exactly one ALPN protocol.
    ///
    /// HTTP/3 is restricted to TLS 1.3 as QUIC requires.
    ///
    /// # Errors
    ///
    /// Returns a TLS error if the crypto provider rejects the protocol versions.
    pub fn client_config(&self, transport: TransportKind) -> Result<ClientConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());
        let builder = ClientConfig::builder_with_provider(provider);
        let builder = match transport {
            TransportKind::Http3 => builder.with_protocol_versions(&[&rustls::version::TLS13]),
            TransportKind::Http2 | TransportKind::Http1 => {
                builder.with_safe_default_protocol_versions()
            }
        }
        .map_err(error::tls)?;

        let mut config = builder
            .with_root_certificates(self.roots.clone())
            .with_no_client_auth();
        config.alpn_protocols = vec![transport.alpn().to_vec()];
        Ok(config)
    }

    /// Connector for TCP-based transports.
    ///
    /// # Errors
    ///
    /// See [`TlsManager::client_config`].
    pub fn connector(&self, transport: TransportKind) -> Result<TlsConnector> {
        Ok(TlsConnector::from(Arc::new(self.client_config(transport)?)))
    }
}

impl std::fmt::Debug for TlsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TlsManager")
            .field("roots", &self.roots.len())
            .finish()
    }
}

/// Run the TLS handshake over `tcp` and require the server to select the
/// transport's ALPN protocol. HTTP/1.1 also accepts a server that negotiates
/// no protocol at all.
pub(crate) async fn handshake(
    connector: &TlsConnector,
    tcp: TcpStream,
    host: &str,
    transport: TransportKind,
) -> Result<TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(host.to_string()).map_err(error::tls)?;
    let stream = connector
        .connect(server_name, tcp)
        .await
        .map_err(error::tls)?;

    let negotiated = stream.get_ref().1.alpn_protocol();
    let accepted = match negotiated {
        Some(protocol) => protocol == transport.alpn(),
        None => transport == TransportKind::Http1,
    };
    if !accepted {
        let offered = std::str::from_utf8(transport.alpn()).unwrap_or("?");
        return Err(error::connect(AlpnRejected {
            offered,
            negotiated: negotiated.map(|p| String::from_utf8_lossy(p).into_owned()),
        }));
    }

    Ok(stream)
}
