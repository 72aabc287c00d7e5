//! Radix4 binary-to-text codec.
//!
//! Radix4 maps arbitrary byte sequences to a 64-character ASCII
//! alphabet (`[-_A-Za-z0-9]` by default). Unlike Base64, any input
//! byte whose value is itself an alphabet character is preserved in
//! the output; the remaining two "radix" bits of each byte are
//! collected into separate radix characters. Those are interleaved
//! with the data in the streamable layout, or grouped at the tail in
//! the block layout. Under optimistic coding a leading run of
//! alphabet-only input encodes as itself, making such encodings
//! near-idempotent.
//!
//! The canonical definitions are [`stream()`] and [`block()`];
//! alternatives are configured via [`Radix4::configure`] or built from
//! scratch with [`Radix4Config`].
//!
//! ```
//! let coding = radix4::stream();
//!
//! let encoded = coding.encode_to_string(b"Hello World!").unwrap();
//! assert!(encoded.starts_with("Hello."));
//!
//! let decoded = coding.decode_from_str(&encoded).unwrap();
//! assert_eq!(decoded, b"Hello World!");
//! ```

mod blocks;
mod coding;
mod config;
mod errors;
mod mapping;
mod profiles;
mod streams;

pub use coding::Radix4;
pub use config::{BuildError, Radix4Config};
pub use errors::{DecodeError, EncodeError};
pub use mapping::{Mapping, MappingError};
pub use profiles::{Profile, ProfileNotFoundError, ProfileRegistry};
pub use streams::{
    CharsSource, EncodedSink, EncodedSource, FmtSink, Radix4Reader, Radix4Writer, ReaderError,
    ReaderSource, SliceSource, StringSink, WriterSink,
};

use std::sync::OnceLock;

/// The standard Radix4 coding definition for streaming data.
pub fn stream() -> &'static Radix4 {
    static STREAM: OnceLock<Radix4> = OnceLock::new();
    STREAM.get_or_init(|| {
        Radix4Config::stream()
            .build()
            .expect("default configuration is valid")
    })
}

/// The standard Radix4 coding definition for block-encoded data.
pub fn block() -> &'static Radix4 {
    static BLOCK: OnceLock<Radix4> = OnceLock::new();
    BLOCK.get_or_init(|| {
        Radix4Config::block()
            .build()
            .expect("default configuration is valid")
    })
}

#[cfg(test)]
mod tests;
