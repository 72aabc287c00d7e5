use std::fmt;

/// Errors that can occur while decoding Radix4 data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The input contains a character that is neither in the alphabet
    /// nor whitespace, or a non-ASCII code point.
    InvalidCharacter { char: char, position: usize },
    /// A terminator appeared at a position where none is allowed.
    MisplacedTerminator { position: usize },
    /// Terminated input did not end with the terminator character.
    MissingTerminator,
    /// The radix-coded region has an impossible length (one more than a
    /// multiple of four characters).
    InvalidLength { length: usize },
    /// Terminated input ended before its terminator was read.
    UnexpectedEndOfStream,
}

impl DecodeError {
    pub(crate) fn invalid_character(c: impl Into<u32>, position: usize) -> Self {
        let c = c.into();
        DecodeError::InvalidCharacter {
            char: char::from_u32(c).unwrap_or(char::REPLACEMENT_CHARACTER),
            position,
        }
    }

    pub(crate) fn misplaced_terminator(position: usize) -> Self {
        DecodeError::MisplacedTerminator { position }
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::InvalidCharacter { char: c, position } => {
                write!(f, "invalid character {:?} at position {}", c, position)
            }
            DecodeError::MisplacedTerminator { position } => {
                write!(f, "unexpected terminator at position {}", position)
            }
            DecodeError::MissingTerminator => {
                write!(f, "missing terminator at end of input")
            }
            DecodeError::InvalidLength { length } => {
                write!(
                    f,
                    "invalid length: {} radix-coded characters cannot be one more than a multiple of four",
                    length
                )
            }
            DecodeError::UnexpectedEndOfStream => {
                write!(f, "unexpected end of stream")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Errors that can occur while encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The predicted encoded length does not fit the platform's size
    /// limit.
    BytesTooLong,
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncodeError::BytesTooLong => write!(f, "encoded length exceeds platform size limit"),
        }
    }
}

impl std::error::Error for EncodeError {}
