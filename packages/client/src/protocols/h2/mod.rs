//! HTTP/2 transport
//!
//! TCP + TLS with ALPN `h2`, driven by the `h2` crate's client.

pub mod strategy;

pub use strategy::H2Transport;
