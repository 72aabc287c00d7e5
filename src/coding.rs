use std::fmt;
use std::io;

use crate::blocks;
use crate::config::Radix4Config;
use crate::errors::{DecodeError, EncodeError};
use crate::mapping::Mapping;
use crate::streams::{
    CharsSource, FmtSink, Radix4Reader, Radix4Writer, ReaderError, ReaderSource, SliceSource,
    StringSink, WriterSink,
};

/// Character code for a byte outside alphabet and whitespace.
pub(crate) const CODE_INVALID: i8 = -1;
/// Character code for a whitespace byte.
pub(crate) const CODE_WHITESPACE: i8 = -2;

/// An immutable Radix4 coding definition.
///
/// A definition combines a byte [`Mapping`] with the operating
/// parameters of the coding: whitespace, terminator, line breaking,
/// stream or block layout, optimism and termination. Definitions are
/// created by freezing a [`Radix4Config`] and are safe for concurrent
/// use from any number of threads.
///
/// The canonical definitions are available from [`crate::stream()`] and
/// [`crate::block()`]; alternatives are configured from those via
/// [`configure`](Radix4::configure).
#[derive(Clone)]
pub struct Radix4 {
    mapping: Mapping,
    whitespace: Vec<u8>,
    terminator: u8,
    line_length: usize,
    line_break: String,
    buffer_size: usize,
    streaming: bool,
    optimistic: bool,
    terminated: bool,
    /// Lookup from an input character to its alphabet index, or one of
    /// the negative [`CODE_INVALID`] / [`CODE_WHITESPACE`] codes.
    codes: [i8; 256],
}

impl Radix4 {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn freeze(
        mapping: Mapping,
        whitespace: Vec<u8>,
        terminator: u8,
        line_length: usize,
        line_break: String,
        buffer_size: usize,
        streaming: bool,
        optimistic: bool,
        terminated: bool,
    ) -> Self {
        let mut codes = [CODE_INVALID; 256];
        for (i, &c) in mapping.chars().iter().enumerate() {
            codes[c as usize] = i as i8;
        }
        for &w in &whitespace {
            codes[w as usize] = CODE_WHITESPACE;
        }
        Radix4 {
            mapping,
            whitespace,
            terminator,
            line_length,
            line_break,
            buffer_size,
            streaming,
            optimistic,
            terminated,
            codes,
        }
    }

    // accessors

    /// The mapping that generates this coding. The mapping determines
    /// which bytes are preserved by the encoding.
    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// The characters treated as whitespace by decoders, sorted.
    pub fn whitespace(&self) -> &[u8] {
        &self.whitespace
    }

    /// The byte used to mark termination.
    pub fn terminator(&self) -> u8 {
        self.terminator
    }

    /// The number of characters between line breaks in encoded output,
    /// or zero when no breaks are inserted.
    pub fn line_length(&self) -> usize {
        self.line_length
    }

    /// The character sequence inserted to form a line break.
    pub fn line_break(&self) -> &str {
        &self.line_break
    }

    /// The number of bytes used to buffer stream encoding, always a
    /// positive multiple of four.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Whether coded data is organized so that it can be streamed, as
    /// opposed to an unstreamable block layout.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Whether coding defers radix characters until a byte with a
    /// non-zero radix is encountered.
    pub fn is_optimistic(&self) -> bool {
        self.optimistic
    }

    /// Whether encoded output is explicitly terminated.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Creates a new configuration initialized to match this
    /// definition.
    pub fn configure(&self) -> Radix4Config {
        Radix4Config::from_coding(self)
    }

    // length calculation

    /// Computes the number of ASCII characters required to encode the
    /// supplied bytes, including any terminators and line breaks.
    ///
    /// # Errors
    ///
    /// Fails with [`EncodeError::BytesTooLong`] when the encoded length
    /// exceeds the platform's size limit.
    pub fn compute_encoded_length(&self, bytes: &[u8]) -> Result<usize, EncodeError> {
        let radix_free = if self.optimistic {
            self.mapping.radix_free_prefix_len(bytes)
        } else {
            0
        };
        let length = self.compute_encoded_length_of(bytes.len() as u64, radix_free as u64)?;
        usize::try_from(length).map_err(|_| EncodeError::BytesTooLong)
    }

    /// Computes the encoded length for a given input length.
    ///
    /// The number of leading radix-free bytes only matters under
    /// optimistic coding; in all other cases zero may be supplied.
    ///
    /// # Panics
    ///
    /// Panics if `radix_free_length` exceeds `byte_length`.
    pub fn compute_encoded_length_of(
        &self,
        byte_length: u64,
        radix_free_length: u64,
    ) -> Result<u64, EncodeError> {
        assert!(
            radix_free_length <= byte_length,
            "radix-free length exceeds byte length"
        );
        let radix_free = if self.optimistic { radix_free_length } else { 0 };
        let radixed = byte_length - radix_free;

        let mut length = (radixed / 3)
            .checked_mul(4)
            .and_then(|n| n.checked_add(radix_free))
            .ok_or(EncodeError::BytesTooLong)?;
        length = length
            .checked_add(match radixed % 3 {
                1 => 2,
                2 => 3,
                _ => 0,
            })
            .ok_or(EncodeError::BytesTooLong)?;

        if self.terminated {
            length = length.checked_add(1).ok_or(EncodeError::BytesTooLong)?;
        }
        // the optimistic marker is omitted only when the prefix spans
        // the whole unterminated input
        if self.optimistic && (self.terminated || radix_free < byte_length) {
            length = length.checked_add(1).ok_or(EncodeError::BytesTooLong)?;
        }

        if self.line_length > 0 && length > 0 {
            let breaks = ((length - 1) / self.line_length as u64)
                .checked_mul(self.line_break.len() as u64)
                .ok_or(EncodeError::BytesTooLong)?;
            length = length.checked_add(breaks).ok_or(EncodeError::BytesTooLong)?;
        }

        Ok(length)
    }

    /// The number of line-break characters among the first `length`
    /// encoded characters.
    pub(crate) fn extra_line_break_length(&self, length: usize) -> usize {
        if length == 0 {
            0
        } else {
            (length - 1) / self.line_length * self.line_break.len()
        }
    }

    // character classification

    /// Resolves a character to its alphabet index, [`CODE_INVALID`] or
    /// [`CODE_WHITESPACE`].
    #[inline]
    pub(crate) fn code(&self, c: u32) -> i8 {
        if c < 256 {
            self.codes[c as usize]
        } else {
            CODE_INVALID
        }
    }

    #[inline]
    pub(crate) fn is_terminator(&self, c: u32) -> bool {
        c == self.terminator as u32
    }

    // batch operations

    /// Encodes bytes to a string, using the block or stream layout
    /// according to this definition.
    pub fn encode_to_string(&self, bytes: &[u8]) -> Result<String, EncodeError> {
        if self.streaming {
            let mut out = String::new();
            let mut writer = self.encoder_to_string(&mut out);
            io::Write::write_all(&mut writer, bytes).expect("string sink cannot fail");
            writer.close().expect("string sink cannot fail");
            Ok(out)
        } else {
            let encoded = blocks::encode(self, bytes)?;
            Ok(String::from_utf8(encoded).expect("encoded output is ASCII"))
        }
    }

    /// Encodes bytes to a byte array of ASCII characters.
    pub fn encode_to_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, EncodeError> {
        if self.streaming {
            let capacity = self.compute_encoded_length(bytes)?;
            let mut out = Vec::with_capacity(capacity);
            let mut writer = Radix4Writer::new(self, WriterSink::new(&mut out));
            io::Write::write_all(&mut writer, bytes).expect("vec sink cannot fail");
            writer.close().expect("vec sink cannot fail");
            Ok(out)
        } else {
            blocks::encode(self, bytes)
        }
    }

    /// Decodes a string of Radix4 encoded data back into bytes,
    /// skipping any whitespace-set characters.
    pub fn decode_from_str(&self, chars: &str) -> Result<Vec<u8>, DecodeError> {
        if self.streaming {
            collect_decoded(self.decoder_from_str(chars))
        } else {
            // non-ASCII input cannot be part of any coding
            if let Some((position, c)) = chars.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
                return Err(DecodeError::InvalidCharacter { char: c, position });
            }
            blocks::decode(self, chars.as_bytes(), true)
        }
    }

    /// Decodes a byte array of Radix4 encoded characters back into
    /// bytes, skipping any whitespace-set characters.
    pub fn decode_from_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, DecodeError> {
        if self.streaming {
            collect_decoded(Radix4Reader::new(self, SliceSource::new(bytes)))
        } else {
            blocks::decode(self, bytes, true)
        }
    }

    // stream adapters
    //
    // Adapters always use the interleaved stream layout: the block
    // layout groups radices at the tail and cannot be produced or
    // consumed incrementally. The streaming flag selects the layout of
    // the batch operations above.

    /// An encoder writing encoded characters to a byte writer. Binary
    /// data written to the returned writer is Radix4 encoded onto
    /// `out`.
    pub fn encoder_to_writer<W: io::Write>(&self, out: W) -> Radix4Writer<'_, WriterSink<W>> {
        Radix4Writer::new(self, WriterSink::new(out))
    }

    /// An encoder writing encoded characters to a formatter sink.
    pub fn encoder_to_fmt<W: fmt::Write>(&self, out: W) -> Radix4Writer<'_, FmtSink<W>> {
        Radix4Writer::new(self, FmtSink::new(out))
    }

    /// An encoder appending encoded characters to a string.
    pub fn encoder_to_string<'a>(
        &'a self,
        out: &'a mut String,
    ) -> Radix4Writer<'a, StringSink<'a>> {
        Radix4Writer::new(self, StringSink::new(out))
    }

    /// A decoder pulling encoded characters from a byte reader. The
    /// returned reader yields the decoded binary data.
    pub fn decoder_from_reader<R: io::Read>(&self, input: R) -> Radix4Reader<'_, ReaderSource<R>> {
        Radix4Reader::new(self, ReaderSource::new(input))
    }

    /// A decoder pulling encoded characters from a string slice.
    pub fn decoder_from_str<'a>(
        &'a self,
        chars: &'a str,
    ) -> Radix4Reader<'a, CharsSource<std::str::Chars<'a>>> {
        Radix4Reader::new(self, CharsSource::new(chars.chars()))
    }

    /// A decoder pulling encoded characters from a character iterator.
    pub fn decoder_from_chars<I>(&self, chars: I) -> Radix4Reader<'_, CharsSource<I>>
    where
        I: Iterator<Item = char>,
    {
        Radix4Reader::new(self, CharsSource::new(chars))
    }
}

fn collect_decoded<S: crate::streams::EncodedSource>(
    mut reader: Radix4Reader<'_, S>,
) -> Result<Vec<u8>, DecodeError> {
    let mut out = Vec::new();
    loop {
        match reader.decode_next() {
            Ok(Some(b)) => out.push(b),
            Ok(None) => return Ok(out),
            Err(ReaderError::Decode(err)) => return Err(err),
            Err(ReaderError::Io(_)) => unreachable!("in-memory source cannot fail"),
        }
    }
}

/// Two definitions are equal if they produce identical codings for all
/// inputs: the line break is ignored when breaks are off, and the
/// terminator is ignored when neither terminated nor optimistic.
impl PartialEq for Radix4 {
    fn eq(&self, other: &Self) -> bool {
        self.streaming == other.streaming
            && self.optimistic == other.optimistic
            && self.terminated == other.terminated
            && self.line_length == other.line_length
            && (self.line_length == 0 || self.line_break == other.line_break)
            && (!(self.terminated || self.optimistic) || self.terminator == other.terminator)
            && self.mapping == other.mapping
    }
}

impl fmt::Debug for Radix4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Radix4")
            .field("mapping", &self.mapping)
            .field("terminator", &(self.terminator as char))
            .field("line_length", &self.line_length)
            .field("streaming", &self.streaming)
            .field("optimistic", &self.optimistic)
            .field("terminated", &self.terminated)
            .finish()
    }
}
