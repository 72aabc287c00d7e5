use std::fmt;
use std::io;

use super::EncodedSource;
use crate::coding::{Radix4, CODE_WHITESPACE};
use crate::errors::DecodeError;

/// Errors raised by [`Radix4Reader`]: either a failure of the
/// underlying source or a coding error in the data it produced.
#[derive(Debug)]
pub enum ReaderError {
    Io(io::Error),
    Decode(DecodeError),
}

impl fmt::Display for ReaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReaderError::Io(err) => err.fmt(f),
            ReaderError::Decode(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ReaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReaderError::Io(err) => Some(err),
            ReaderError::Decode(err) => Some(err),
        }
    }
}

impl From<io::Error> for ReaderError {
    fn from(err: io::Error) -> Self {
        ReaderError::Io(err)
    }
}

impl From<DecodeError> for ReaderError {
    fn from(err: DecodeError) -> Self {
        ReaderError::Decode(err)
    }
}

impl From<ReaderError> for io::Error {
    fn from(err: ReaderError) -> Self {
        match err {
            ReaderError::Io(err) => err,
            ReaderError::Decode(DecodeError::UnexpectedEndOfStream) => io::Error::new(
                io::ErrorKind::UnexpectedEof,
                DecodeError::UnexpectedEndOfStream,
            ),
            ReaderError::Decode(err) => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

/// A character pulled from the source, classified.
enum Token {
    /// An alphabet character, resolved to its 6-bit value.
    Code(u8),
    Terminator,
    End,
}

/// An incremental Radix4 decoder.
///
/// Pulls encoded characters from a source, skips whitespace, honors
/// the optimistic prefix and termination rules of its definition and
/// yields decoded bytes one at a time. The reader is single-owner.
///
/// In terminated mode the reader stops pulling from the source once
/// the terminator has been consumed, leaving any trailing content for
/// the caller.
pub struct Radix4Reader<'a, S: EncodedSource> {
    coding: &'a Radix4,
    source: S,
    /// reconstructed bytes of the current triple
    bs: [u8; 3],
    /// index of the next byte to yield from `bs`
    i: usize,
    /// one past the last valid byte in `bs`; equal to `i` at end
    j: usize,
    /// whether the optimistic prefix is still being read
    radix_free: bool,
    /// characters consumed from the source, for error positions
    consumed: usize,
}

impl<'a, S: EncodedSource> Radix4Reader<'a, S> {
    pub(crate) fn new(coding: &'a Radix4, source: S) -> Self {
        Radix4Reader {
            coding,
            source,
            bs: [0; 3],
            i: 0,
            j: 3,
            radix_free: coding.is_optimistic(),
            consumed: 0,
        }
    }

    /// Decodes the next byte, or `None` at the end of the stream.
    pub fn decode_next(&mut self) -> Result<Option<u8>, ReaderError> {
        if self.i == self.j {
            return Ok(None);
        }
        let mapping = self.coding.mapping();

        if self.radix_free {
            match self.next_token()? {
                Token::Code(code) => return Ok(Some(mapping.unmap(code))),
                Token::Terminator => {
                    // end of the radix-free prefix, fall through to
                    // triple decoding
                    self.radix_free = false;
                }
                Token::End => {
                    if self.coding.is_terminated() {
                        return Err(DecodeError::UnexpectedEndOfStream.into());
                    }
                    self.j = 0;
                    return Ok(None);
                }
            }
        }

        if self.i == 0 && !self.fill_triple()? {
            return Ok(None);
        }
        let b = self.bs[self.i];
        self.i += 1;
        if self.i == 3 {
            self.i = 0;
        }
        Ok(Some(mapping.unmap(b)))
    }

    /// Reads one radix character and up to three data characters,
    /// shrinking `j` on a legal tail. Returns false at a clean end of
    /// stream.
    fn fill_triple(&mut self) -> Result<bool, ReaderError> {
        let terminated = self.coding.is_terminated();

        let radix = match self.next_token()? {
            Token::Code(code) => code as u32,
            Token::Terminator => {
                if !terminated {
                    return Err(self.misplaced().into());
                }
                self.j = 0;
                return Ok(false);
            }
            Token::End => {
                if terminated {
                    return Err(DecodeError::UnexpectedEndOfStream.into());
                }
                self.j = 0;
                return Ok(false);
            }
        };

        // a stream cannot end directly after a radix character
        self.bs[0] = match self.next_token()? {
            Token::Code(code) => code | ((radix << 2) & 0xc0) as u8,
            Token::Terminator => return Err(self.misplaced().into()),
            Token::End => return Err(DecodeError::UnexpectedEndOfStream.into()),
        };

        match self.next_token()? {
            Token::Code(code) => {
                self.bs[1] = code | ((radix << 4) & 0xc0) as u8;
                match self.next_token()? {
                    Token::Code(code) => {
                        self.bs[2] = code | ((radix << 6) & 0xc0) as u8;
                    }
                    Token::Terminator if terminated => self.j = 2,
                    Token::Terminator => return Err(self.misplaced().into()),
                    Token::End if terminated => {
                        return Err(DecodeError::UnexpectedEndOfStream.into())
                    }
                    Token::End => self.j = 2,
                }
            }
            Token::Terminator if terminated => self.j = 1,
            Token::Terminator => return Err(self.misplaced().into()),
            Token::End if terminated => return Err(DecodeError::UnexpectedEndOfStream.into()),
            Token::End => self.j = 1,
        }
        Ok(true)
    }

    /// Pulls the next non-whitespace character and classifies it.
    fn next_token(&mut self) -> Result<Token, ReaderError> {
        loop {
            let c = match self.source.next_char()? {
                Some(c) => c,
                None => return Ok(Token::End),
            };
            self.consumed += 1;
            if self.coding.is_terminator(c) {
                return Ok(Token::Terminator);
            }
            let code = self.coding.code(c);
            if code == CODE_WHITESPACE {
                continue;
            }
            if code < 0 {
                return Err(DecodeError::invalid_character(c, self.consumed - 1).into());
            }
            return Ok(Token::Code(code as u8));
        }
    }

    fn misplaced(&self) -> DecodeError {
        DecodeError::misplaced_terminator(self.consumed - 1)
    }

    /// Decodes the next byte, mapping coding errors into I/O errors.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.decode_next().map_err(io::Error::from)
    }
}

impl<S: EncodedSource> io::Read for Radix4Reader<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.decode_next() {
                Ok(Some(b)) => {
                    buf[n] = b;
                    n += 1;
                }
                Ok(None) => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(n)
    }
}
