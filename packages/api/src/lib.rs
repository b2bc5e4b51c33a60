//! Trifetch public API
//!
//! Validates a target URL, fetches it through the HTTP/3 → HTTP/2 → HTTP/1.1
//! cascade, and hands back either a decoded body, the raw upstream response
//! for byte-for-byte relaying, or an article summary built by a pluggable
//! extractor.

#![deny(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]

pub mod extract;
pub mod relay;
pub mod service;

pub use extract::{Article, ArticleExtractor, ArticleSummary, ExtractError};
pub use relay::relay;
pub use service::{FetchService, summarize_html};

// Re-export important types from client package
pub use trifetch_client::{
    Cascade, DecodedResponse, DecodedStream, Error, FetchConfig, FetchRequest, FetchResult,
    FetchTarget, Kind, ResponseBody, Result, Transport, TransportKind,
};
