//! Open response bodies
//!
//! `ResponseBody` is the transport-independent body every transport hands
//! back. It owns the connection's close hook, so releasing the body releases
//! the connection that produced it.

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::time::{Instant, Sleep};

use crate::error;
use crate::Result;

/// Raw body chunks as produced by a transport.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

type CloseHook = Box<dyn FnOnce() + Send>;

/// An open, not-yet-consumed response body.
///
/// Reaching end of stream does not close the connection; only `close` or
/// dropping the body does, exactly once.
pub struct ResponseBody {
    chunks: Option<ByteStream>,
    deadline: Option<Pin<Box<Sleep>>>,
    on_close: Option<CloseHook>,
    done: bool,
}

impl ResponseBody {
    pub fn new<S>(chunks: S) -> Self
    where
        S: Stream<Item = Result<Bytes>> + Send + 'static,
    {
        Self {
            chunks: Some(chunks.boxed()),
            deadline: None,
            on_close: None,
            done: false,
        }
    }

    /// A body that yields the given chunks in order.
    pub fn from_chunks<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Bytes>,
        I::IntoIter: Send + 'static,
    {
        Self::new(stream::iter(chunks.into_iter().map(Ok)))
    }

    pub fn empty() -> Self {
        Self::new(stream::empty())
    }

    /// Run `hook` when the body is released.
    #[must_use]
    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Fail the next read once `deadline` passes.
    pub fn set_deadline(&mut self, deadline: Instant) {
        self.deadline = Some(Box::pin(tokio::time::sleep_until(deadline)));
    }

    /// Read the remaining body into memory, then release it.
    pub async fn bytes(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.next().await {
            buf.extend_from_slice(&chunk?);
        }
        self.close();
        Ok(buf.freeze())
    }

    /// Release the body and its connection.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.done = true;
        self.deadline = None;
        // drop the stream before the hook tears the connection down
        drop(self.chunks.take());
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }
}

impl Stream for ResponseBody {
    type Item = Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }

        if let Some(deadline) = this.deadline.as_mut() {
            if deadline.as_mut().poll(cx).is_ready() {
                this.done = true;
                return Poll::Ready(Some(Err(error::timeout())));
            }
        }

        let Some(chunks) = this.chunks.as_mut() else {
            return Poll::Ready(None);
        };

        match chunks.poll_next_unpin(cx) {
            Poll::Ready(Some(Err(e))) => {
                this.done = true;
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                this.done = true;
                Poll::Ready(None)
            }
            other => other,
        }
    }
}

impl Drop for ResponseBody {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBody")
            .field("open", &self.chunks.is_some())
            .field("done", &self.done)
            .finish()
    }
}
