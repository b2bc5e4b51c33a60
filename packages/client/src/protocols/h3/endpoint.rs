//! QUIC endpoint setup

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use quinn::crypto::rustls::QuicClientConfig;
use quinn::{ClientConfig, Endpoint, IdleTimeout, TransportConfig};

use crate::Result;
use crate::error;

/// Client configuration for QUIC connections carrying HTTP/3.
pub(super) fn client_config(
    tls: rustls::ClientConfig,
    idle_timeout: Duration,
) -> Result<ClientConfig> {
    let crypto = QuicClientConfig::try_from(tls).map_err(error::tls)?;
    let mut config = ClientConfig::new(Arc::new(crypto));

    let mut transport = TransportConfig::default();
    let idle = IdleTimeout::try_from(idle_timeout).map_err(error::builder)?;
    transport.max_idle_timeout(Some(idle));
    config.transport_config(Arc::new(transport));

    Ok(config)
}

/// Bind a client endpoint, dual-stack when the host allows it.
pub(super) fn bind() -> Result<Endpoint> {
    match Endpoint::client(SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))) {
        Ok(endpoint) => Ok(endpoint),
        Err(e) => {
            tracing::debug!(target: "trifetch::h3", error = %e, "IPv6 endpoint unavailable, binding IPv4");
            Endpoint::client(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).map_err(error::connect)
        }
    }
}

/// First resolved address the endpoint can reach.
pub(super) fn pick_address(
    addrs: impl IntoIterator<Item = SocketAddr>,
    ipv4_only: bool,
) -> Option<SocketAddr> {
    addrs
        .into_iter()
        .find(|addr| !ipv4_only || addr.is_ipv4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv4_endpoint_skips_ipv6_addresses() {
        let v6: SocketAddr = "[2001:db8::1]:443".parse().unwrap();
        let v4: SocketAddr = "192.0.2.1:443".parse().unwrap();

        assert_eq!(pick_address([v6, v4], true), Some(v4));
        assert_eq!(pick_address([v6, v4], false), Some(v6));
        assert_eq!(pick_address([v6], true), None);
    }

    #[test]
    fn idle_timeout_must_fit_varint() {
        let tls = rustls::ClientConfig::builder_with_provider(Arc::new(
            rustls::crypto::ring::default_provider(),
        ))
        .with_protocol_versions(&[&rustls::version::TLS13])
        .unwrap()
        .with_root_certificates(rustls::RootCertStore::empty())
        .with_no_client_auth();

        assert!(client_config(tls, Duration::from_secs(30)).is_ok());
    }
}
