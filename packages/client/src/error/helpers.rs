use std::fmt;

/// A marker type to indicate that an attempt timed out.
#[derive(Debug)]
pub struct TimedOut;

impl fmt::Display for TimedOut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("timed out")
    }
}

impl std::error::Error for TimedOut {}

/// A marker type to indicate that a transport cannot serve the URL scheme.
#[derive(Debug)]
pub struct UnsupportedScheme(pub(crate) String);

impl fmt::Display for UnsupportedScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported scheme {:?}", self.0)
    }
}

impl std::error::Error for UnsupportedScheme {}

/// A marker type to indicate that the server refused the offered ALPN protocol.
#[derive(Debug)]
pub struct AlpnRejected {
    pub(crate) offered: &'static str,
    pub(crate) negotiated: Option<String>,
}

impl fmt::Display for AlpnRejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.negotiated {
            Some(negotiated) => write!(
                f,
                "server negotiated {negotiated:?} instead of {:?}",
                self.offered
            ),
            None => write!(f, "server did not negotiate {:?}", self.offered),
        }
    }
}

impl std::error::Error for AlpnRejected {}

/// A marker type to indicate that a redirect chain was too long.
#[derive(Debug)]
pub struct TooManyRedirects(pub(crate) usize);

impl fmt::Display for TooManyRedirects {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stopped after {} redirects", self.0)
    }
}

impl std::error::Error for TooManyRedirects {}
