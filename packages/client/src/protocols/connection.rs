//! Per-attempt connection ownership
//!
//! Every transport opens a fresh connection per request and spawns a task to
//! drive it. The task handle lives in a `ConnectionTask`, which aborts the
//! driver when dropped, so a timed-out or failed attempt cannot leave a
//! connection running behind the next one.

use std::future::Future;

use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use super::core::{FetchRequest, TransportKind};
use crate::Result;
use crate::error;

/// Owns the spawned driver of one connection.
#[derive(Debug)]
pub(crate) struct ConnectionTask {
    handle: JoinHandle<()>,
    transport: TransportKind,
}

impl ConnectionTask {
    pub(crate) fn spawn<F>(transport: TransportKind, driver: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: tokio::spawn(driver),
            transport,
        }
    }
}

impl Drop for ConnectionTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            tracing::trace!(
                target: "trifetch::connection",
                transport = %self.transport,
                "aborting connection driver"
            );
            self.handle.abort();
        }
    }
}

/// Open a TCP connection to the request's authority.
pub(crate) async fn connect_tcp(request: &FetchRequest) -> Result<TcpStream> {
    let host = request.host()?;
    let port = request.port()?;

    let tcp = TcpStream::connect((host, port))
        .await
        .map_err(|e| error::connect(e).with_url(request.url().clone()))?;
    tcp.set_nodelay(true).map_err(error::connect)?;
    Ok(tcp)
}
