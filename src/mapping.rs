use std::fmt;

/// The byte permutation that defines a Radix4 coding.
///
/// A mapping is a bijection on unsigned byte values whose first 64
/// decoded values are the encoding alphabet. Bytes that map into the
/// range `[0, 64)` carry no radix bits and are preserved verbatim by
/// the encoding.
///
/// Mappings are immutable once constructed and cheap to clone; a single
/// mapping may be shared freely between codings and threads.
#[derive(Clone)]
pub struct Mapping {
    /// The 64 alphabet characters, indexed by alphabet value.
    chars: [u8; 64],
    /// Lookup from a mapped value to the raw byte it decodes to.
    decmap: [u8; 256],
    /// Lookup from a raw byte to its mapped value.
    encmap: [u8; 256],
}

/// Default alphabet: `_`, digits, uppercase, lowercase, `-`.
/// The remaining 192 entries place common control and punctuation bytes
/// so that typical text yields long radix-free runs.
const DEFAULT_DECMAP: [u8; 256] = [
    0x5f, 0x30, 0x31, 0x32, 0x33, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39, 0x41, 0x42, 0x43, 0x44, 0x45,
    0x46, 0x47, 0x48, 0x49, 0x4a, 0x4b, 0x4c, 0x4d, 0x4e, 0x4f, 0x50, 0x51, 0x52, 0x53, 0x54, 0x55,
    0x56, 0x57, 0x58, 0x59, 0x5a, 0x61, 0x62, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69, 0x6a, 0x6b,
    0x6c, 0x6d, 0x6e, 0x6f, 0x70, 0x71, 0x72, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79, 0x7a, 0x2d,
    0x00, 0x25, 0x1f, 0x1e, 0x1d, 0x1c, 0x80, 0x81, 0x82, 0x83, 0x84, 0x01, 0x02, 0x03, 0x04, 0x05,
    0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15,
    0x16, 0x17, 0x18, 0x19, 0x1a, 0x27, 0x5c, 0x3a, 0x85, 0x21, 0x86, 0x3e, 0x87, 0x88, 0x89, 0x8a,
    0x3c, 0x8b, 0x23, 0x8c, 0x28, 0x22, 0x5d, 0x24, 0x8d, 0x8e, 0x8f, 0x90, 0x2a, 0x91, 0x92, 0x20,
    0x2c, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0x9b, 0x9c, 0x9d, 0x9e, 0x9f, 0x7f, 0x1b,
    0xa0, 0xa1, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xab, 0xac, 0xad, 0xae, 0xaf,
    0xb0, 0xb1, 0xb2, 0xb3, 0xb4, 0x40, 0xb5, 0x5e, 0xb6, 0x26, 0xb7, 0x60, 0xb8, 0xb9, 0xba, 0xbb,
    0x5b, 0xbc, 0xbd, 0xbe, 0x2b, 0x29, 0x7d, 0x2f, 0xbf, 0xc0, 0xc1, 0xc2, 0xc3, 0xc4, 0xc5, 0x7c,
    0x2e, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xcb, 0xcc, 0xcd, 0xce, 0xcf, 0xd0, 0xd1, 0xd2, 0xd3, 0xd4,
    0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xdb, 0xdc, 0xdd, 0xde, 0xdf, 0xe0, 0xe1, 0xe2, 0xe3, 0xe4,
    0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea, 0xeb, 0xec, 0xed, 0x3d, 0xee, 0xef, 0xf0, 0xf1, 0xf2, 0xf3,
    0x7b, 0xf4, 0xf5, 0xf6, 0xf7, 0x3f, 0xf8, 0x3b, 0xf9, 0xfa, 0xfb, 0xfc, 0xfd, 0xfe, 0xff, 0x7e,
];

/// Errors raised when constructing a [`Mapping`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// An alphabet character is outside the ASCII range.
    NonAsciiChar(char),
    /// The same character appears twice in the alphabet.
    DuplicateChar(char),
    /// The supplied alphabet or decoding map has the wrong length.
    WrongLength { expected: usize, actual: usize },
    /// A decoding map repeats a byte value and so is not a bijection.
    NotAPermutation { value: u8 },
}

impl fmt::Display for MappingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingError::NonAsciiChar(c) => {
                write!(f, "non-ASCII character in alphabet: {:?}", c)
            }
            MappingError::DuplicateChar(c) => {
                write!(f, "duplicate character in alphabet: {:?}", c)
            }
            MappingError::WrongLength { expected, actual } => {
                write!(f, "expected {} entries, got {}", expected, actual)
            }
            MappingError::NotAPermutation { value } => {
                write!(f, "duplicate byte value {:#04x} in decoding map", value)
            }
        }
    }
}

impl std::error::Error for MappingError {}

impl Mapping {
    /// Creates a mapping from a 64-character ASCII alphabet.
    ///
    /// The alphabet characters become the decoded values of `0..64` in
    /// the order given; the remaining byte values fill the rest of the
    /// decoding map in ascending order.
    ///
    /// # Errors
    ///
    /// Returns an error if the alphabet is not exactly 64 characters,
    /// contains a non-ASCII character, or repeats a character.
    pub fn with_alphabet(alphabet: &str) -> Result<Self, MappingError> {
        let count = alphabet.chars().count();
        if count != 64 {
            return Err(MappingError::WrongLength {
                expected: 64,
                actual: count,
            });
        }

        let mut decmap = [0u8; 256];
        let mut used = [false; 256];
        for (i, c) in alphabet.chars().enumerate() {
            if !c.is_ascii() {
                return Err(MappingError::NonAsciiChar(c));
            }
            let b = c as u8;
            if used[b as usize] {
                return Err(MappingError::DuplicateChar(c));
            }
            used[b as usize] = true;
            decmap[i] = b;
        }

        // remaining byte values decode in ascending order
        let mut index = 64;
        for b in 0..=255u8 {
            if !used[b as usize] {
                decmap[index] = b;
                index += 1;
            }
        }

        Ok(Self::derive(decmap))
    }

    /// Creates a mapping from a full 256-entry decoding map.
    ///
    /// The map must be a permutation of every byte value; its first 64
    /// entries become the alphabet and must be distinct ASCII values.
    ///
    /// # Errors
    ///
    /// Returns an error if the slice is not 256 entries long, repeats a
    /// value, or places a non-ASCII byte in the alphabet range.
    pub fn from_decoding_map(decmap: &[u8]) -> Result<Self, MappingError> {
        if decmap.len() != 256 {
            return Err(MappingError::WrongLength {
                expected: 256,
                actual: decmap.len(),
            });
        }

        let mut seen = [false; 256];
        for &d in decmap {
            if seen[d as usize] {
                return Err(MappingError::NotAPermutation { value: d });
            }
            seen[d as usize] = true;
        }
        for &c in &decmap[..64] {
            if c > 127 {
                return Err(MappingError::NonAsciiChar(c as char));
            }
        }

        let mut map = [0u8; 256];
        map.copy_from_slice(decmap);
        Ok(Self::derive(map))
    }

    fn derive(decmap: [u8; 256]) -> Self {
        let mut encmap = [0u8; 256];
        for (i, &d) in decmap.iter().enumerate() {
            encmap[d as usize] = i as u8;
        }
        let mut chars = [0u8; 64];
        chars.copy_from_slice(&decmap[..64]);
        Mapping {
            chars,
            decmap,
            encmap,
        }
    }

    /// Returns a copy of the 256-entry decoding map.
    pub fn decoding_map(&self) -> [u8; 256] {
        self.decmap
    }

    /// Maps a raw byte to its coded value.
    #[inline]
    pub fn map_byte(&self, b: u8) -> u8 {
        self.encmap[b as usize]
    }

    /// Decodes a coded value back to the raw byte it represents.
    #[inline]
    pub fn unmap(&self, m: u8) -> u8 {
        self.decmap[m as usize]
    }

    /// Whether a raw byte maps into the alphabet range and so carries
    /// no radix bits.
    #[inline]
    pub fn is_radix_free(&self, b: u8) -> bool {
        self.encmap[b as usize] & 0xc0 == 0
    }

    /// The length of the longest leading run of radix-free bytes.
    pub fn radix_free_prefix_len(&self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .position(|&b| !self.is_radix_free(b))
            .unwrap_or(bytes.len())
    }

    /// The alphabet character for a 6-bit coded value.
    #[inline]
    pub(crate) fn char_at(&self, index: u8) -> u8 {
        self.chars[index as usize]
    }

    pub(crate) fn chars(&self) -> &[u8; 64] {
        &self.chars
    }
}

impl Default for Mapping {
    fn default() -> Self {
        Self::derive(DEFAULT_DECMAP)
    }
}

impl PartialEq for Mapping {
    fn eq(&self, other: &Self) -> bool {
        self.decmap == other.decmap
    }
}

impl Eq for Mapping {}

impl fmt::Debug for Mapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // the alphabet characterizes the mapping well enough for debugging
        let alphabet: String = self.chars.iter().map(|&b| b as char).collect();
        f.debug_struct("Mapping").field("alphabet", &alphabet).finish()
    }
}
