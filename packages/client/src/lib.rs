//! # trifetch client
//!
//! Fetches a URL over the best transport that works, trying HTTP/3 (QUIC),
//! then HTTP/2, then HTTP/1.1, and normalizes gzip, deflate and brotli
//! bodies into a single uncompressed byte stream.
//!
//! ## Features
//!
//! - **Ordered transport fallback**: one attempt per transport, each bounded
//!   by its own deadline, never raced
//! - **Rustls TLS** with webpki and native root certificates; verification
//!   is always on
//! - **Streaming decompression** with a fixed release order: the decoder is
//!   finalized before the connection is closed
//! - **Structured errors** that keep every failed attempt for diagnostics
//!
//! ## Usage
//!
//! ```no_run
//! use trifetch_client::{Cascade, FetchConfig, FetchTarget};
//!
//! # async fn run() -> trifetch_client::Result<()> {
//! let cascade = Cascade::new(FetchConfig::default())?;
//! let target = FetchTarget::parse("https://example.com/")?;
//!
//! let response = cascade.fetch(target.url()).await?.decode().await?;
//! println!("{} via {}", response.status(), response.transport());
//! let html = response.bytes().await?;
//! # let _ = html;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod http;
pub mod protocols;
pub mod tls;

pub use config::{FetchConfig, TlsConfig};
pub use error::{Error, FetchError, Kind, Result};
pub use crate::http::{
    ContentEncoding, DecodedResponse, DecodedStream, Decompress, FetchResult, FetchTarget,
    ResponseBody,
};
pub use protocols::{Cascade, FetchRequest, Transport, TransportKind};
