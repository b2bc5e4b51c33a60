//! Streaming body decompression
//!
//! Each codec is fed raw body chunks as they arrive from the network and hands
//! back whatever output they produced. The decoders write into an in-memory
//! `Vec<u8>` sink which is drained after every chunk, so memory stays bounded
//! by the size of a single decompressed chunk.

use std::io::{self, Write};

use bytes::Bytes;
use flate2::write::{DeflateDecoder, MultiGzDecoder};

use crate::http::headers::ContentEncoding;

/// Buffer size for the brotli window writer.
const BROTLI_BUFFER_SIZE: usize = 4096;

/// A decompression strategy selected from a response's `Content-Encoding`.
///
/// `release` finalizes the codec and frees its buffers. `DecodedStream`
/// always calls it before closing the network body.
pub trait Decompress: Send {
    fn encoding(&self) -> ContentEncoding;

    /// Feed one compressed chunk and return the bytes it produced.
    fn decompress(&mut self, input: &[u8]) -> io::Result<Bytes>;

    /// Signal end of input, verify the stream is complete and flush any
    /// remaining output.
    fn finish(&mut self) -> io::Result<Bytes>;

    fn release(self: Box<Self>) {}
}

/// Build the codec for `encoding`, or `None` for passthrough.
#[must_use]
pub fn decoder_for(encoding: ContentEncoding) -> Option<Box<dyn Decompress>> {
    match encoding {
        ContentEncoding::Gzip => Some(Box::new(GzipDecompressor::new())),
        ContentEncoding::Deflate => Some(Box::new(DeflateDecompressor::new())),
        ContentEncoding::Brotli => Some(Box::new(BrotliDecompressor::new())),
        ContentEncoding::Identity => None,
    }
}

#[inline]
fn drain(sink: &mut Vec<u8>) -> Bytes {
    if sink.is_empty() {
        Bytes::new()
    } else {
        Bytes::from(std::mem::take(sink))
    }
}

/// gzip (RFC 1952) decoder. Concatenated members decode as one stream.
pub struct GzipDecompressor {
    inner: MultiGzDecoder<Vec<u8>>,
}

impl GzipDecompressor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: MultiGzDecoder::new(Vec::new()),
        }
    }
}

impl Default for GzipDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompress for GzipDecompressor {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::Gzip
    }

    fn decompress(&mut self, input: &[u8]) -> io::Result<Bytes> {
        self.inner.write_all(input)?;
        self.inner.flush()?;
        Ok(drain(self.inner.get_mut()))
    }

    fn finish(&mut self) -> io::Result<Bytes> {
        self.inner.try_finish()?;
        Ok(drain(self.inner.get_mut()))
    }
}

/// Raw deflate (RFC 1951) decoder, no zlib wrapper.
pub struct DeflateDecompressor {
    inner: DeflateDecoder<Vec<u8>>,
}

impl DeflateDecompressor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: DeflateDecoder::new(Vec::new()),
        }
    }
}

impl Default for DeflateDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompress for DeflateDecompressor {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::Deflate
    }

    fn decompress(&mut self, input: &[u8]) -> io::Result<Bytes> {
        self.inner.write_all(input)?;
        self.inner.flush()?;
        Ok(drain(self.inner.get_mut()))
    }

    fn finish(&mut self) -> io::Result<Bytes> {
        self.inner.try_finish()?;
        Ok(drain(self.inner.get_mut()))
    }
}

/// Brotli (RFC 7932) decoder.
pub struct BrotliDecompressor {
    inner: brotli::DecompressorWriter<Vec<u8>>,
}

impl BrotliDecompressor {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: brotli::DecompressorWriter::new(Vec::new(), BROTLI_BUFFER_SIZE),
        }
    }
}

impl Default for BrotliDecompressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompress for BrotliDecompressor {
    fn encoding(&self) -> ContentEncoding {
        ContentEncoding::Brotli
    }

    fn decompress(&mut self, input: &[u8]) -> io::Result<Bytes> {
        self.inner.write_all(input)?;
        self.inner.flush()?;
        Ok(drain(self.inner.get_mut()))
    }

    fn finish(&mut self) -> io::Result<Bytes> {
        self.inner.close()?;
        Ok(drain(self.inner.get_mut()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::{DeflateEncoder, GzEncoder};

    use super::*;

    const PAGE: &[u8] = b"<html><body>Hello</body></html>";

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn brotli(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut out, 4096, 5, 22);
            writer.write_all(data).unwrap();
        }
        out
    }

    fn run(codec: &mut dyn Decompress, input: &[u8], chunk: usize) -> Vec<u8> {
        let mut out = Vec::new();
        for piece in input.chunks(chunk) {
            out.extend_from_slice(&codec.decompress(piece).unwrap());
        }
        out.extend_from_slice(&codec.finish().unwrap());
        out
    }

    #[test]
    fn gzip_in_small_chunks() {
        let mut codec = GzipDecompressor::new();
        assert_eq!(run(&mut codec, &gzip(PAGE), 3), PAGE);
    }

    #[test]
    fn gzip_concatenated_members() {
        let mut body = gzip(b"<html><body>");
        body.extend_from_slice(&gzip(b"Hello</body></html>"));

        let mut codec = GzipDecompressor::new();
        assert_eq!(run(&mut codec, &body, 7), PAGE);
    }

    #[test]
    fn deflate_single_chunk() {
        let mut codec = DeflateDecompressor::new();
        assert_eq!(run(&mut codec, &deflate(PAGE), 1024), PAGE);
    }

    #[test]
    fn brotli_large_body() {
        let body: Vec<u8> = PAGE.iter().copied().cycle().take(200_000).collect();
        let mut codec = BrotliDecompressor::new();
        assert_eq!(run(&mut codec, &brotli(&body), 8192), body);
    }

    #[test]
    fn gzip_rejects_plain_text() {
        let mut codec = GzipDecompressor::new();
        assert!(codec.decompress(b"this is not gzip at all").is_err());
    }

    #[test]
    fn selection_by_encoding() {
        assert!(decoder_for(ContentEncoding::Identity).is_none());
        for encoding in [
            ContentEncoding::Gzip,
            ContentEncoding::Deflate,
            ContentEncoding::Brotli,
        ] {
            let codec = decoder_for(encoding).unwrap();
            assert_eq!(codec.encoding(), encoding);
            codec.release();
        }
    }
}
