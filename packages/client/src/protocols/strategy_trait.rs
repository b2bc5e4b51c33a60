//! Transport trait - common interface for the HTTP/3, HTTP/2 and HTTP/1.1
//! attempts a `Cascade` makes.

use futures::future::BoxFuture;

use super::core::{FetchRequest, TransportKind};
use crate::Result;
use crate::http::FetchResult;

/// One way of performing a single request/response exchange.
///
/// An implementation opens its own connection for every call, sends the
/// request as a GET with no body, and returns once response headers arrive.
/// It does not follow redirects; the cascade does that on top of `send`.
/// Dropping the returned future or the result's body tears the connection
/// down.
pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    fn send<'a>(&'a self, request: &'a FetchRequest) -> BoxFuture<'a, Result<FetchResult>>;
}
