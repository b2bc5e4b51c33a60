pub mod classification;
pub mod constructors;
pub mod helpers;
pub mod types;

pub use constructors::*;
pub use helpers::{AlpnRejected, TimedOut, TooManyRedirects, UnsupportedScheme};
pub use types::{AttemptFailure, Error, Kind, Result};

// Type alias for callers that spell the error after its role
pub type FetchError = Error;
