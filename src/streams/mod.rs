//! Incremental stream encoding and decoding.
//!
//! The stream layout interleaves one radix character ahead of every
//! three data characters so output can be decoded as it arrives. The
//! encoder and decoder are generic over small sink and source
//! capabilities with adapters for the standard byte and character I/O
//! types.

mod decoder;
mod encoder;

pub use decoder::{Radix4Reader, ReaderError};
pub use encoder::Radix4Writer;

use std::fmt;
use std::io;

/// A destination for encoded ASCII characters.
pub trait EncodedSink {
    /// Writes a run of encoded characters.
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Writes the configured line-break sequence.
    fn write_line_break(&mut self, line_break: &str) -> io::Result<()>;

    /// Flushes the underlying destination.
    fn flush(&mut self) -> io::Result<()>;

    /// Closes the underlying destination. Sinks with no notion of
    /// closing do nothing.
    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A source of encoded characters, pulled one at a time.
pub trait EncodedSource {
    /// The next character, or `None` at end of stream.
    fn next_char(&mut self) -> io::Result<Option<u32>>;
}

/// Sink adapter over a byte writer.
pub struct WriterSink<W: io::Write> {
    inner: W,
}

impl<W: io::Write> WriterSink<W> {
    pub fn new(inner: W) -> Self {
        WriterSink { inner }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: io::Write> EncodedSink for WriterSink<W> {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.inner.write_all(chunk)
    }

    fn write_line_break(&mut self, line_break: &str) -> io::Result<()> {
        self.inner.write_all(line_break.as_bytes())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }

    fn close(&mut self) -> io::Result<()> {
        // a Rust writer closes when dropped; the flush is the part of
        // a close that can be forwarded
        self.inner.flush()
    }
}

/// Sink adapter over a character writer.
pub struct FmtSink<W: fmt::Write> {
    inner: W,
}

impl<W: fmt::Write> FmtSink<W> {
    pub fn new(inner: W) -> Self {
        FmtSink { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.inner
            .write_str(s)
            .map_err(|_| io::Error::other("formatter error"))
    }
}

impl<W: fmt::Write> EncodedSink for FmtSink<W> {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let s = std::str::from_utf8(chunk).expect("encoded output is ASCII");
        self.write_str(s)
    }

    fn write_line_break(&mut self, line_break: &str) -> io::Result<()> {
        self.write_str(line_break)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink adapter appending to a string.
pub struct StringSink<'a> {
    inner: &'a mut String,
}

impl<'a> StringSink<'a> {
    pub fn new(inner: &'a mut String) -> Self {
        StringSink { inner }
    }
}

impl EncodedSink for StringSink<'_> {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        let s = std::str::from_utf8(chunk).expect("encoded output is ASCII");
        self.inner.push_str(s);
        Ok(())
    }

    fn write_line_break(&mut self, line_break: &str) -> io::Result<()> {
        self.inner.push_str(line_break);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Source adapter over a byte reader.
pub struct ReaderSource<R: io::Read> {
    inner: R,
}

impl<R: io::Read> ReaderSource<R> {
    pub fn new(inner: R) -> Self {
        ReaderSource { inner }
    }
}

impl<R: io::Read> EncodedSource for ReaderSource<R> {
    fn next_char(&mut self) -> io::Result<Option<u32>> {
        let mut byte = [0u8; 1];
        loop {
            match self.inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0] as u32)),
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

/// Source adapter over a byte slice.
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> SliceSource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        SliceSource { bytes, position: 0 }
    }
}

impl EncodedSource for SliceSource<'_> {
    fn next_char(&mut self) -> io::Result<Option<u32>> {
        match self.bytes.get(self.position) {
            Some(&b) => {
                self.position += 1;
                Ok(Some(b as u32))
            }
            None => Ok(None),
        }
    }
}

/// Source adapter over a character iterator.
pub struct CharsSource<I: Iterator<Item = char>> {
    chars: I,
}

impl<I: Iterator<Item = char>> CharsSource<I> {
    pub fn new(chars: I) -> Self {
        CharsSource { chars }
    }
}

impl<I: Iterator<Item = char>> EncodedSource for CharsSource<I> {
    fn next_char(&mut self) -> io::Result<Option<u32>> {
        Ok(self.chars.next().map(|c| c as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Radix4Config;
    use crate::errors::DecodeError;
    use std::io::Write;

    fn stream() -> crate::Radix4 {
        Radix4Config::stream().build().unwrap()
    }

    fn encode(coding: &crate::Radix4, bytes: &[u8]) -> String {
        coding.encode_to_string(bytes).unwrap()
    }

    #[test]
    fn test_terminator_before_first_unpreserved_character() {
        let coding = stream();
        let encoded = encode(&coding, b"Hello World!");
        assert!(encoded.starts_with("Hello."));
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), b"Hello World!");
    }

    #[test]
    fn test_radix_free_input_is_preserved() {
        let coding = stream();
        assert_eq!(encode(&coding, b"ABC123"), "ABC123");
    }

    #[test]
    fn test_terminated_radix_free_input_gets_two_terminators() {
        let coding = Radix4Config::stream().terminated(true).build().unwrap();
        assert_eq!(encode(&coding, b"ABC123"), "ABC123..");
        assert_eq!(coding.decode_from_str("ABC123..").unwrap(), b"ABC123");
    }

    #[test]
    fn test_write_fails_after_close() {
        let coding = stream();
        let mut out = Vec::new();
        let mut writer = coding.encoder_to_writer(&mut out);
        writer.write_all(&[1]).unwrap();
        writer.close().unwrap();
        let err = writer.write_all(&[2]).unwrap_err();
        assert!(err.to_string().contains("stream closed"));
    }

    #[test]
    fn test_close_forwards_to_sink_only_when_not_terminated() {
        struct RecordingSink {
            closed: bool,
        }

        impl EncodedSink for RecordingSink {
            fn write_chunk(&mut self, _chunk: &[u8]) -> std::io::Result<()> {
                Ok(())
            }

            fn write_line_break(&mut self, _line_break: &str) -> std::io::Result<()> {
                Ok(())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }

            fn close(&mut self) -> std::io::Result<()> {
                self.closed = true;
                Ok(())
            }
        }

        let coding = stream();
        let mut writer = Radix4Writer::new(&coding, RecordingSink { closed: false });
        writer.write_all(b"ABC").unwrap();
        let sink = writer.finish().unwrap();
        assert!(sink.closed);

        // a terminated stream is self-delimited, so the sink is left
        // open for further content
        let coding = Radix4Config::stream().terminated(true).build().unwrap();
        let mut writer = Radix4Writer::new(&coding, RecordingSink { closed: false });
        writer.write_all(b"ABC").unwrap();
        let sink = writer.finish().unwrap();
        assert!(!sink.closed);
    }

    #[test]
    fn test_close_is_idempotent() {
        let coding = Radix4Config::stream().terminated(true).build().unwrap();
        let mut out = String::new();
        let mut writer = coding.encoder_to_string(&mut out);
        writer.write_all(b"ABC").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert_eq!(out, "ABC..");
    }

    #[test]
    fn test_chunked_writes_match_single_write() {
        let coding = stream();
        let data: Vec<u8> = (0..=255).chain(0..=255).collect();
        let whole = encode(&coding, &data);

        for chunk_size in [1, 2, 3, 5, 7, 64] {
            let mut out = String::new();
            let mut writer = coding.encoder_to_string(&mut out);
            for chunk in data.chunks(chunk_size) {
                writer.write_all(chunk).unwrap();
            }
            writer.close().unwrap();
            assert_eq!(out, whole, "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_small_buffer_matches_default() {
        let coding = stream();
        let small = Radix4Config::stream().buffer_size(4).build().unwrap();
        let data: Vec<u8> = (0..=255).collect();
        assert_eq!(encode(&coding, &data), encode(&small, &data));
    }

    #[test]
    fn test_line_breaks_round_trip() {
        let coding = Radix4Config::stream()
            .line_length(10)
            .buffer_size(4)
            .build()
            .unwrap();
        let data: Vec<u8> = (0..30).map(|i| i * 7).collect();
        let encoded = encode(&coding, &data);
        assert_eq!(encoded.trim(), encoded);
        assert_eq!(
            encoded.len(),
            coding.compute_encoded_length(&data).unwrap()
        );
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), data);
    }

    #[test]
    fn test_whitespace_invariance() {
        let coding = stream();
        let encoded = encode(&coding, b"Hello World!");
        let spaced: String = encoded.chars().flat_map(|c| ['\t', c, '\n']).collect();
        assert_eq!(coding.decode_from_str(&spaced).unwrap(), b"Hello World!");
    }

    #[test]
    fn test_decoder_from_reader() {
        let coding = stream();
        let encoded = coding.encode_to_bytes(b"Hello World!").unwrap();
        let mut reader = coding.decoder_from_reader(&encoded[..]);
        let mut decoded = Vec::new();
        std::io::Read::read_to_end(&mut reader, &mut decoded).unwrap();
        assert_eq!(decoded, b"Hello World!");
    }

    #[test]
    fn test_terminated_decode_ignores_trailing_content() {
        let coding = Radix4Config::stream().terminated(true).build().unwrap();
        let mut encoded = coding.encode_to_string(b"Hello World!").unwrap();
        encoded.push_str("% trailing garbage");
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), b"Hello World!");
    }

    #[test]
    fn test_unexpected_end_of_stream() {
        let coding = Radix4Config::stream().terminated(true).build().unwrap();
        assert_eq!(
            coding.decode_from_str("ABC"),
            Err(DecodeError::UnexpectedEndOfStream)
        );
    }

    #[test]
    fn test_unexpected_terminator() {
        let coding = Radix4Config::stream().optimistic(false).build().unwrap();
        assert_eq!(
            coding.decode_from_str(".ABC"),
            Err(DecodeError::MisplacedTerminator { position: 0 })
        );
    }

    #[test]
    fn test_invalid_character() {
        let coding = stream();
        assert_eq!(
            coding.decode_from_str("AB~C"),
            Err(DecodeError::InvalidCharacter {
                char: '~',
                position: 2
            })
        );
    }

    #[test]
    fn test_fmt_sink() {
        let coding = stream();
        let mut out = String::new();
        {
            let mut writer = coding.encoder_to_fmt(&mut out);
            writer.write_all(b"Hello World!").unwrap();
            writer.close().unwrap();
        }
        assert_eq!(out, encode(&coding, b"Hello World!"));
    }

    #[test]
    fn test_finish_returns_sink() {
        let coding = stream();
        let mut writer = coding.encoder_to_writer(Vec::new());
        writer.write_all(b"ABC123").unwrap();
        let sink = writer.finish().unwrap();
        assert_eq!(sink.into_inner(), b"ABC123");
    }
}
