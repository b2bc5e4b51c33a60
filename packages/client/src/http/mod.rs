//! Request headers, response bodies and content decoding

pub mod body;
pub mod compression;
pub mod decoded;
pub mod headers;
pub mod response;
pub mod target;

pub use body::{ByteStream, ResponseBody};
pub use compression::{Decompress, decoder_for};
pub use decoded::{DecodedResponse, DecodedStream};
pub use headers::{ContentEncoding, browser_headers};
pub use response::FetchResult;
pub use target::FetchTarget;
