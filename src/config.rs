use std::fmt;

use crate::coding::Radix4;
use crate::mapping::{Mapping, MappingError};

const DEFAULT_BUFFER_SIZE: usize = 64;
const DEFAULT_LINE_BREAK: &str = "\n";
const DEFAULT_TERMINATOR: char = '.';
const DEFAULT_WHITESPACE: &str = "\r\n\t ";

/// Errors raised when freezing an invalid [`Radix4Config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The terminator is non-ASCII, an alphabet character, or a
    /// whitespace character.
    InvalidTerminator(char),
    /// The line break is empty or contains non-whitespace characters.
    InvalidLineBreak,
    /// The whitespace set contains a non-ASCII character, a duplicate,
    /// or an alphabet character.
    InvalidWhitespace(char),
    /// The supplied alphabet could not be turned into a mapping.
    InvalidMapping(MappingError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::InvalidTerminator(c) => write!(f, "invalid terminator: {:?}", c),
            BuildError::InvalidLineBreak => {
                write!(f, "line break must be non-empty whitespace")
            }
            BuildError::InvalidWhitespace(c) => {
                write!(f, "invalid whitespace character: {:?}", c)
            }
            BuildError::InvalidMapping(err) => write!(f, "invalid mapping: {}", err),
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::InvalidMapping(err) => Some(err),
            _ => None,
        }
    }
}

impl From<MappingError> for BuildError {
    fn from(err: MappingError) -> Self {
        BuildError::InvalidMapping(err)
    }
}

/// A mutable configuration from which [`Radix4`] definitions are built.
///
/// Configurations start from the stream or block defaults and are
/// adjusted through chained setters; [`build`](Radix4Config::build)
/// validates the combination and freezes it into an immutable
/// definition. A configuration may be reused to build any number of
/// definitions.
///
/// ```
/// use radix4::Radix4Config;
///
/// let coding = Radix4Config::stream().terminated(true).build().unwrap();
/// assert_eq!(coding.encode_to_string(b"ABC123").unwrap(), "ABC123..");
/// ```
#[derive(Debug, Clone)]
pub struct Radix4Config {
    mapping: Mapping,
    alphabet: Option<String>,
    whitespace: String,
    terminator: char,
    buffer_size: usize,
    line_length: usize,
    line_break: String,
    streaming: bool,
    optimistic: bool,
    terminated: bool,
}

impl Radix4Config {
    /// A configuration with the defaults for streamable output.
    pub fn stream() -> Self {
        Self::new(true)
    }

    /// A configuration with the defaults for block output.
    pub fn block() -> Self {
        Self::new(false)
    }

    fn new(streaming: bool) -> Self {
        Radix4Config {
            mapping: Mapping::default(),
            alphabet: None,
            whitespace: DEFAULT_WHITESPACE.to_string(),
            terminator: DEFAULT_TERMINATOR,
            buffer_size: DEFAULT_BUFFER_SIZE,
            line_length: 0,
            line_break: DEFAULT_LINE_BREAK.to_string(),
            streaming,
            optimistic: true,
            terminated: false,
        }
    }

    pub(crate) fn from_coding(coding: &Radix4) -> Self {
        Radix4Config {
            mapping: coding.mapping().clone(),
            alphabet: None,
            whitespace: coding.whitespace().iter().map(|&b| b as char).collect(),
            terminator: coding.terminator() as char,
            buffer_size: coding.buffer_size(),
            line_length: coding.line_length(),
            line_break: coding.line_break().to_string(),
            streaming: coding.is_streaming(),
            optimistic: coding.is_optimistic(),
            terminated: coding.is_terminated(),
        }
    }

    /// Uses the given byte mapping.
    pub fn mapping(mut self, mapping: Mapping) -> Self {
        self.mapping = mapping;
        self.alphabet = None;
        self
    }

    /// Uses a mapping derived from a 64-character ASCII alphabet.
    ///
    /// The alphabet is validated when the configuration is built.
    pub fn alphabet(mut self, alphabet: &str) -> Self {
        self.alphabet = Some(alphabet.to_string());
        self
    }

    /// The number of bytes used to buffer stream encoding. Rounded up
    /// to a multiple of four on build; zero restores the default.
    pub fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = if buffer_size == 0 {
            DEFAULT_BUFFER_SIZE
        } else {
            buffer_size
        };
        self
    }

    /// The number of characters between line breaks in encoded output,
    /// or zero to disable line breaking.
    pub fn line_length(mut self, line_length: usize) -> Self {
        self.line_length = line_length;
        self
    }

    /// The character sequence inserted as a line break. Must be
    /// non-empty and consist of whitespace-set characters only.
    pub fn line_break(mut self, line_break: &str) -> Self {
        self.line_break = line_break.to_string();
        self
    }

    /// The set of characters that decoders silently skip.
    pub fn whitespace(mut self, whitespace: &str) -> Self {
        self.whitespace = whitespace.to_string();
        self
    }

    /// Whether coded data is organized so it can be streamed, or laid
    /// out as an unstreamable block.
    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Whether encoding defers radix characters until the first byte
    /// with a non-zero radix is encountered.
    pub fn optimistic(mut self, optimistic: bool) -> Self {
        self.optimistic = optimistic;
        self
    }

    /// Whether encoded output is explicitly terminated.
    pub fn terminated(mut self, terminated: bool) -> Self {
        self.terminated = terminated;
        self
    }

    /// The character used to mark termination and the end of an
    /// optimistic prefix.
    pub fn terminator(mut self, terminator: char) -> Self {
        self.terminator = terminator;
        self
    }

    /// Validates this configuration and freezes it into an immutable
    /// [`Radix4`] definition.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the alphabet is invalid, whitespace
    /// characters collide with the alphabet or each other, the
    /// terminator is not a free ASCII character, or the line break is
    /// not made of whitespace.
    pub fn build(&self) -> Result<Radix4, BuildError> {
        let mapping = match &self.alphabet {
            Some(alphabet) => Mapping::with_alphabet(alphabet)?,
            None => self.mapping.clone(),
        };

        // whitespace must be ASCII, duplicate free and disjoint from
        // the alphabet
        let mut whitespace = Vec::with_capacity(self.whitespace.len());
        for c in self.whitespace.chars() {
            if !c.is_ascii() {
                return Err(BuildError::InvalidWhitespace(c));
            }
            let b = c as u8;
            if whitespace.contains(&b) || mapping.chars().contains(&b) {
                return Err(BuildError::InvalidWhitespace(c));
            }
            whitespace.push(b);
        }
        whitespace.sort_unstable();

        if !self.terminator.is_ascii() {
            return Err(BuildError::InvalidTerminator(self.terminator));
        }
        let terminator = self.terminator as u8;
        if mapping.chars().contains(&terminator) || whitespace.contains(&terminator) {
            return Err(BuildError::InvalidTerminator(self.terminator));
        }

        if self.line_break.is_empty()
            || self
                .line_break
                .chars()
                .any(|c| !c.is_ascii() || !whitespace.contains(&(c as u8)))
        {
            return Err(BuildError::InvalidLineBreak);
        }

        // multiple-of-four buffers keep whole triples in place between
        // flushes
        let buffer_size = self.buffer_size.div_ceil(4) * 4;

        Ok(Radix4::freeze(
            mapping,
            whitespace,
            terminator,
            self.line_length,
            self.line_break.clone(),
            buffer_size,
            self.streaming,
            self.optimistic,
            self.terminated,
        ))
    }
}
