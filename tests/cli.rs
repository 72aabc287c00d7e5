//! CLI integration tests for radix4
//!
//! Tests the binary as a user would interact with it.

use assert_cmd::Command;
use predicates::prelude::*;

fn radix4() -> Command {
    Command::cargo_bin("radix4").expect("binary exists")
}

#[test]
fn test_help() {
    radix4()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Radix4 binary-to-text codec"));
}

#[test]
fn test_version() {
    radix4()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("radix4"));
}

#[test]
fn test_list_profiles() {
    radix4()
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("stream"))
        .stdout(predicate::str::contains("block"))
        .stdout(predicate::str::contains("mime"));
}

#[test]
fn test_encode_default_profile() {
    radix4()
        .write_stdin("Hello World!")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Hello."));
}

#[test]
fn test_encode_preserves_alphabet_input() {
    radix4()
        .args(["--encode", "stream"])
        .write_stdin("ABC123")
        .assert()
        .success()
        .stdout("ABC123\n");
}

#[test]
fn test_terminated_flag() {
    radix4()
        .args(["--encode", "stream", "--terminated"])
        .write_stdin("ABC123")
        .assert()
        .success()
        .stdout("ABC123..\n");
}

#[test]
fn test_round_trip_through_binary() {
    let encoded = radix4()
        .args(["-e", "block"])
        .write_stdin("some test payload: \x01\x02\x03")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    radix4()
        .args(["-d", "block"])
        .write_stdin(encoded)
        .assert()
        .success()
        .stdout("some test payload: \x01\x02\x03");
}

#[test]
fn test_streaming_round_trip() {
    let encoded = radix4()
        .args(["-e", "stream", "--stream"])
        .write_stdin("streamed payload 123")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    radix4()
        .args(["-d", "stream", "--stream"])
        .write_stdin(encoded)
        .assert()
        .success()
        .stdout("streamed payload 123");
}

#[test]
fn test_line_length_flag() {
    let output = radix4()
        .args(["-e", "plain", "--line-length", "8"])
        .write_stdin("0123456789abcdef")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.lines().next().unwrap().len() == 8);
}

#[test]
fn test_unknown_profile_suggests_alternative() {
    radix4()
        .args(["-e", "straem"])
        .write_stdin("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"))
        .stderr(predicate::str::contains("stream"));
}

#[test]
fn test_encode_and_decode_flags_conflict() {
    radix4()
        .args(["-e", "stream", "-d", "stream"])
        .write_stdin("x")
        .assert()
        .failure();
}

#[test]
fn test_decode_invalid_input_fails() {
    radix4()
        .args(["-d", "block"])
        .write_stdin("not valid radix4 !!!")
        .assert()
        .failure();
}
