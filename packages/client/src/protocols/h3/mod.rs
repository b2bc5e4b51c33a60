//! HTTP/3 transport
//!
//! QUIC via `quinn`, HTTP/3 framing via `h3` over `h3-quinn`.

mod endpoint;
pub mod strategy;

pub use strategy::H3Transport;
