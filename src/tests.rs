use crate::{block, stream, DecodeError, Radix4Config};

#[test]
fn test_canonical_definitions() {
    assert!(stream().is_streaming());
    assert!(!block().is_streaming());
    assert!(stream().is_optimistic());
    assert!(!stream().is_terminated());
    // the statics are shared, not rebuilt
    assert!(std::ptr::eq(stream(), stream()));
}

#[test]
fn test_stream_and_block_agree_on_length() {
    let stream = stream();
    let block = block();
    for data in [
        &b""[..],
        b"A",
        b"AB",
        b"Hello World!",
        b"\x00\x80\xff",
        b"_0123456789-",
    ] {
        assert_eq!(
            stream.compute_encoded_length(data).unwrap(),
            block.compute_encoded_length(data).unwrap(),
            "length mismatch for {:?}",
            data
        );
    }
}

#[test]
fn test_length_matches_encoded_output() {
    for coding in [
        Radix4Config::stream().build().unwrap(),
        Radix4Config::block().build().unwrap(),
        Radix4Config::stream().terminated(true).build().unwrap(),
        Radix4Config::block().terminated(true).build().unwrap(),
        Radix4Config::stream().optimistic(false).build().unwrap(),
        Radix4Config::block()
            .optimistic(false)
            .line_length(7)
            .build()
            .unwrap(),
    ] {
        for data in [
            &b""[..],
            b"A",
            b"~",
            b"Hello World!",
            b"ABC123",
            b"\x00\x01\x02\x03\xfc\xfd\xfe\xff",
        ] {
            let encoded = coding.encode_to_string(data).unwrap();
            assert_eq!(
                encoded.len(),
                coding.compute_encoded_length(data).unwrap(),
                "length mismatch for {:?} with {:?}",
                data,
                coding
            );
        }
    }
}

#[test]
fn test_encode_to_bytes_matches_string() {
    for coding in [stream(), block()] {
        let data = b"Hello World!";
        let string = coding.encode_to_string(data).unwrap();
        let bytes = coding.encode_to_bytes(data).unwrap();
        assert_eq!(string.as_bytes(), &bytes[..]);
    }
}

#[test]
fn test_alphabet_discipline() {
    let alphabet = "_0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz-";
    let data: Vec<u8> = (0..=255).collect();
    for coding in [stream(), block()] {
        let encoded = coding.encode_to_string(&data).unwrap();
        for c in encoded.chars() {
            assert!(
                alphabet.contains(c) || c == '.',
                "unexpected character {:?}",
                c
            );
        }
    }
}

#[test]
fn test_cross_layout_decoding_is_rejected() {
    // block output is not valid stream input; the default stream
    // decoder may misread it as garbage triples, but a terminated
    // decoder notices that no terminator ever arrives
    let data: Vec<u8> = (200..=255).collect();
    let encoded = block().encode_to_string(&data).unwrap();
    let coding = Radix4Config::stream().terminated(true).build().unwrap();
    assert_eq!(
        coding.decode_from_str(&encoded),
        Err(DecodeError::UnexpectedEndOfStream)
    );
}

#[test]
fn test_default_mapping_idempotence() {
    // every alphabet-only input is its own encoding in both layouts
    let inputs = ["", "A", "hello_world", "TOTAL-0123456789"];
    for coding in [stream(), block()] {
        for input in inputs {
            assert_eq!(
                coding.encode_to_string(input.as_bytes()).unwrap(),
                input,
                "not idempotent"
            );
        }
    }
}

#[test]
fn test_custom_alphabet_round_trip() {
    // rot13-flavoured alphabet: same characters, different order
    let alphabet = "-zyxwvutsrqponmlkjihgfedcba_ZYXWVUTSRQPONMLKJIHGFEDCBA9876543210";
    let coding = Radix4Config::stream().alphabet(alphabet).build().unwrap();
    let data = b"Hello World!\x00\xff";
    let encoded = coding.encode_to_string(data).unwrap();
    assert_eq!(coding.decode_from_str(&encoded).unwrap(), data);

    // alphabet-only input is still preserved
    assert_eq!(coding.encode_to_string(b"abc").unwrap(), "abc");
}

#[test]
fn test_custom_terminator() {
    let coding = Radix4Config::stream()
        .terminator('!')
        .terminated(true)
        .build()
        .unwrap();
    assert_eq!(coding.encode_to_string(b"ABC123").unwrap(), "ABC123!!");
    assert_eq!(coding.decode_from_str("ABC123!!").unwrap(), b"ABC123");
}
