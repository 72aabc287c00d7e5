//! Single-pass block encoding and decoding.
//!
//! The block layout places every data character first and groups the
//! radix characters at the tail of the output, which makes the format
//! unstreamable but allows both passes to run over pre-sized buffers.

use std::borrow::Cow;

use crate::coding::{Radix4, CODE_WHITESPACE};
use crate::errors::{DecodeError, EncodeError};

/// Writes output characters while inserting line breaks at the
/// configured column. Positions are raw buffer indices; a break
/// occupies the slots between the last column and the next line.
struct BreakWriter<'a> {
    line_break: &'a [u8],
    line_length: usize,
    full_line_length: usize,
    enabled: bool,
}

impl<'a> BreakWriter<'a> {
    fn new(coding: &'a Radix4) -> Self {
        let line_break = coding.line_break().as_bytes();
        let line_length = coding.line_length();
        BreakWriter {
            line_break,
            line_length,
            full_line_length: line_length + line_break.len(),
            enabled: line_length > 0,
        }
    }

    fn write(&self, out: &mut [u8], mut position: usize, b: u8) -> usize {
        if self.enabled && position % self.full_line_length == self.line_length {
            out[position..position + self.line_break.len()].copy_from_slice(self.line_break);
            position += self.line_break.len();
        }
        out[position] = b;
        position + 1
    }
}

/// Encodes bytes into a freshly allocated block-layout buffer.
pub(crate) fn encode(coding: &Radix4, bytes: &[u8]) -> Result<Vec<u8>, EncodeError> {
    let length = coding.compute_encoded_length(bytes)?;
    let mut out = vec![0u8; length];
    let mapping = coding.mapping();
    let writer = BreakWriter::new(coding);

    // index at which to read the next byte
    let mut i = 0;
    // position at which to write the next data character
    let mut position = 0;
    let mut marker_written = false;

    // first deal with any optimistic bytes
    if coding.is_optimistic() {
        while i < bytes.len() {
            let m = mapping.map_byte(bytes[i]);
            if m & 0xc0 != 0 {
                break;
            }
            position = writer.write(&mut out, position, mapping.char_at(m));
            i += 1;
        }
        // mark the end of the radix-free bytes unless it's unnecessary
        if i < bytes.len() || coding.is_terminated() {
            position = writer.write(&mut out, position, coding.terminator());
            marker_written = true;
        }
    }

    // then the radix-coded remainder, radices trailing the data
    {
        let prefix_chars = i + usize::from(marker_written);
        let data_end = prefix_chars + (bytes.len() - i);
        let mut offset = if writer.enabled {
            data_end + coding.extra_line_break_length(data_end)
        } else {
            data_end
        };

        // index within the triple: 0, 1 or 2
        let mut index = 0u32;
        // accumulates the radices of byte triples
        let mut radix = 0u8;
        while i < bytes.len() {
            let m = mapping.map_byte(bytes[i]);
            i += 1;
            position = writer.write(&mut out, position, mapping.char_at(m & 0x3f));
            index += 1;
            radix |= (m & 0xc0) >> (index * 2);
            if index == 3 {
                offset = writer.write(&mut out, offset, mapping.char_at(radix));
                index = 0;
                radix = 0;
            }
        }
        if index != 0 {
            writer.write(&mut out, offset, mapping.char_at(radix));
        }
    }

    // finally terminate if necessary
    if coding.is_terminated() {
        let mut position = length - 1;
        // a terminator opening a new line still owns the break before it
        if writer.enabled && position > 0 && position % writer.full_line_length == 0 {
            position -= writer.line_break.len();
        }
        writer.write(&mut out, position, coding.terminator());
    }

    Ok(out)
}

/// Decodes a block-layout character sequence. Positions reported in
/// errors refer to the whitespace-stripped input.
pub(crate) fn decode(
    coding: &Radix4,
    input: &[u8],
    strip_whitespace: bool,
) -> Result<Vec<u8>, DecodeError> {
    let chars: Cow<[u8]> = if strip_whitespace
        && input.iter().any(|&b| coding.code(b as u32) == CODE_WHITESPACE)
    {
        Cow::Owned(
            input
                .iter()
                .copied()
                .filter(|&b| coding.code(b as u32) != CODE_WHITESPACE)
                .collect(),
        )
    } else {
        Cow::Borrowed(input)
    };
    let chars = &chars[..];
    let mapping = coding.mapping();
    let mut length = chars.len();

    if coding.is_terminated() {
        if length == 0 || !coding.is_terminator(chars[length - 1] as u32) {
            return Err(DecodeError::MissingTerminator);
        }
        length -= 1;
    }

    // under optimism the last terminator separates the radix-free
    // prefix from the radix-coded tail
    let (first_radix, term_len) = if coding.is_optimistic() {
        match chars[..length]
            .iter()
            .rposition(|&b| coding.is_terminator(b as u32))
        {
            Some(position) => (position, 1),
            None => (length, 0),
        }
    } else {
        (0, 0)
    };

    // successful optimism with a superfluous marker
    if term_len == 1 && first_radix == length - 1 {
        length = first_radix;
    }

    let size = if first_radix == length {
        length
    } else {
        let len = length - first_radix - term_len;
        if len & 3 == 1 {
            return Err(DecodeError::InvalidLength { length: len });
        }
        first_radix + len / 4 * 3 + match len & 3 {
            2 => 1,
            3 => 2,
            _ => 0,
        }
    };
    let mut out = vec![0u8; size];

    // transfer radix-free bytes
    for (i, slot) in out.iter_mut().enumerate().take(first_radix) {
        let c = chars[i];
        if coding.is_terminator(c as u32) {
            return Err(DecodeError::misplaced_terminator(i));
        }
        let code = coding.code(c as u32);
        if code < 0 {
            return Err(DecodeError::invalid_character(c, i));
        }
        *slot = mapping.unmap(code as u8);
    }

    // transfer radix-coded bytes: data characters from `start`, radix
    // characters from `offset` directly after them
    if first_radix < size {
        let start = first_radix + term_len;
        let count = size - first_radix;
        let mut offset = size + term_len;
        let mut index = 2u32;
        let mut radix = 0u8;
        for i in 0..count {
            index += 1;
            if index == 3 {
                radix = read_code(coding, chars, offset)?;
                index = 0;
                offset += 1;
            }
            let code = read_code(coding, chars, start + i)?;
            let b = code & 0x3f | (((radix as u32) << ((index + 1) * 2)) & 0xc0) as u8;
            out[first_radix + i] = mapping.unmap(b);
        }
    }

    Ok(out)
}

fn read_code(coding: &Radix4, chars: &[u8], position: usize) -> Result<u8, DecodeError> {
    let c = chars[position];
    if coding.is_terminator(c as u32) {
        return Err(DecodeError::misplaced_terminator(position));
    }
    let code = coding.code(c as u32);
    if code < 0 {
        return Err(DecodeError::invalid_character(c, position));
    }
    Ok(code as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Radix4Config;

    fn block() -> Radix4 {
        Radix4Config::block().build().unwrap()
    }

    #[test]
    fn test_radix_free_input_is_preserved() {
        let coding = block();
        let encoded = coding.encode_to_string(b"ABC123").unwrap();
        assert_eq!(encoded, "ABC123");
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), b"ABC123");
    }

    #[test]
    fn test_optimistic_prefix_and_marker() {
        let coding = block();
        let encoded = coding.encode_to_string(b"Hello World!").unwrap();
        assert!(encoded.starts_with("Hello."));
        assert_eq!(encoded.len(), 16);
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), b"Hello World!");
    }

    #[test]
    fn test_terminated_round_trip() {
        let coding = Radix4Config::block().terminated(true).build().unwrap();
        let encoded = coding.encode_to_string(b"ABC123").unwrap();
        assert_eq!(encoded, "ABC123..");
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), b"ABC123");

        let encoded = coding.encode_to_string(b"Hello World!").unwrap();
        assert!(encoded.ends_with('.'));
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), b"Hello World!");
    }

    #[test]
    fn test_empty_input() {
        let coding = block();
        assert_eq!(coding.encode_to_string(b"").unwrap(), "");
        assert_eq!(coding.decode_from_str("").unwrap(), b"");

        let coding = Radix4Config::block().terminated(true).build().unwrap();
        assert_eq!(coding.encode_to_string(b"").unwrap(), "..");
        assert_eq!(coding.decode_from_str("..").unwrap(), b"");
    }

    #[test]
    fn test_non_optimistic_round_trip() {
        let coding = Radix4Config::block().optimistic(false).build().unwrap();
        let data: Vec<u8> = (0..=255).collect();
        let encoded = coding.encode_to_string(&data).unwrap();
        assert_eq!(encoded.len(), coding.compute_encoded_length(&data).unwrap());
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), data);
    }

    #[test]
    fn test_all_byte_values_round_trip() {
        let coding = block();
        let data: Vec<u8> = (0..=255).rev().collect();
        let encoded = coding.encode_to_bytes(&data).unwrap();
        assert_eq!(coding.decode_from_bytes(&encoded).unwrap(), data);
    }

    #[test]
    fn test_whitespace_is_skipped() {
        let coding = block();
        let encoded = coding.encode_to_string(b"Hello World!").unwrap();
        let spaced: String = encoded
            .chars()
            .flat_map(|c| [c, '\n'])
            .collect();
        assert_eq!(coding.decode_from_str(&spaced).unwrap(), b"Hello World!");
    }

    #[test]
    fn test_line_breaks_round_trip() {
        let coding = Radix4Config::block()
            .optimistic(false)
            .line_length(4)
            .build()
            .unwrap();
        let encoded = coding.encode_to_string(b"abcdef").unwrap();
        assert_eq!(encoded.len(), 9);
        assert_eq!(&encoded[4..5], "\n");
        assert_eq!(encoded.trim(), encoded);
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), b"abcdef");
    }

    #[test]
    fn test_terminator_on_line_boundary() {
        // three bytes encode to four characters, so the terminator
        // opens the second line
        let coding = Radix4Config::block()
            .optimistic(false)
            .terminated(true)
            .line_length(4)
            .build()
            .unwrap();
        let encoded = coding.encode_to_string(b"xyz").unwrap();
        assert_eq!(encoded.len(), 6);
        assert_eq!(&encoded[4..], "\n.");
        assert_eq!(coding.decode_from_str(&encoded).unwrap(), b"xyz");
    }

    #[test]
    fn test_missing_terminator() {
        let coding = Radix4Config::block().terminated(true).build().unwrap();
        assert_eq!(
            coding.decode_from_str("ABC123"),
            Err(DecodeError::MissingTerminator)
        );
        assert_eq!(
            coding.decode_from_str(""),
            Err(DecodeError::MissingTerminator)
        );
    }

    #[test]
    fn test_invalid_length() {
        let coding = Radix4Config::block().optimistic(false).build().unwrap();
        assert_eq!(
            coding.decode_from_str("AAAAA"),
            Err(DecodeError::InvalidLength { length: 5 })
        );
    }

    #[test]
    fn test_invalid_character() {
        let coding = Radix4Config::block().optimistic(false).build().unwrap();
        assert_eq!(
            coding.decode_from_str("AB!C"),
            Err(DecodeError::InvalidCharacter {
                char: '!',
                position: 2
            })
        );
        assert_eq!(
            coding.decode_from_str("ABé"),
            Err(DecodeError::InvalidCharacter {
                char: 'é',
                position: 2
            })
        );
    }

    #[test]
    fn test_misplaced_terminator() {
        let coding = Radix4Config::block().optimistic(false).build().unwrap();
        assert_eq!(
            coding.decode_from_str("AB.C"),
            Err(DecodeError::MisplacedTerminator { position: 2 })
        );
    }

    #[test]
    fn test_stray_terminator_in_optimistic_prefix() {
        // the last terminator wins the backward scan, so an earlier one
        // sits inside the presumed radix-free prefix
        let coding = block();
        let err = coding.decode_from_str("AB.CD.xyzV").unwrap_err();
        assert_eq!(err, DecodeError::MisplacedTerminator { position: 2 });
    }
}
