use std::io;

use super::EncodedSink;
use crate::coding::Radix4;

fn stream_closed() -> io::Error {
    io::Error::other("stream closed")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// Optimistic prefix still running: bytes are emitted verbatim.
    RadixFree,
    /// Radix coding: one slot is reserved ahead of every data triple.
    Coding,
    /// Closed, by `close` or by an observed sink failure.
    Closed,
}

/// An incremental Radix4 encoder.
///
/// Binary data written to the writer is encoded in the stream layout
/// and emitted to the wrapped sink in buffered chunks. The writer is
/// single-owner: it must be [`close`](Radix4Writer::close)d (or
/// [`finish`](Radix4Writer::finish)ed) to emit any partial triple and
/// the terminators; a dropped writer loses whatever is still buffered.
///
/// ```
/// use std::io::Write;
///
/// let coding = radix4::stream();
/// let mut out = String::new();
/// let mut writer = coding.encoder_to_string(&mut out);
/// writer.write_all(b"Hello World!").unwrap();
/// writer.close().unwrap();
/// assert!(out.starts_with("Hello."));
/// ```
pub struct Radix4Writer<'a, S: EncodedSink> {
    coding: &'a Radix4,
    sink: S,
    buffer: Vec<u8>,
    /// position at which to write the next byte into the buffer
    position: usize,
    /// accumulates the radices of byte triples
    radix: u8,
    /// index within the triple: 0, 1 or 2
    index: u32,
    /// non-whitespace characters flushed so far, tracked for line
    /// breaking across flushes
    count: u64,
    stage: Stage,
}

impl<'a, S: EncodedSink> Radix4Writer<'a, S> {
    pub(crate) fn new(coding: &'a Radix4, sink: S) -> Self {
        Radix4Writer {
            coding,
            sink,
            buffer: vec![0; coding.buffer_size()],
            position: 0,
            radix: 0,
            index: 0,
            count: 0,
            stage: if coding.is_optimistic() {
                Stage::RadixFree
            } else {
                Stage::Coding
            },
        }
    }

    /// Encodes a single byte.
    ///
    /// # Errors
    ///
    /// Fails with a `stream closed` error once the writer has been
    /// closed or a sink failure has been observed; sink errors
    /// propagate as-is.
    pub fn write_byte(&mut self, b: u8) -> io::Result<()> {
        let mapping = self.coding.mapping();
        let m = mapping.map_byte(b);
        let c = m & 0x3f;

        match self.stage {
            Stage::Closed => return Err(stream_closed()),
            Stage::RadixFree => {
                if c == m {
                    // still radix free
                    self.buffer[self.position] = mapping.char_at(c);
                    self.position += 1;
                } else {
                    // no longer radix free
                    self.flush_buffer_with_term()?;
                    self.stage = Stage::Coding;
                }
            }
            Stage::Coding => {}
        }

        if self.stage == Stage::Coding {
            // make room for the radix
            if self.index == 0 {
                self.position += 1;
            }
            self.buffer[self.position] = mapping.char_at(c);
            self.position += 1;
            self.index += 1;
            self.radix |= (m & 0xc0) >> (self.index * 2);
            // store the radix when full and reset
            if self.index == 3 {
                self.buffer[self.position - 4] = mapping.char_at(self.radix);
                self.index = 0;
                self.radix = 0;
            }
        }

        // if the buffer's full, empty it
        if self.position == self.buffer.len() {
            self.flush_buffer()?;
        }
        Ok(())
    }

    /// Flushes buffered characters to the sink and flushes the sink.
    ///
    /// A partial triple stays buffered until it completes or the
    /// writer is closed: emitting it early would misalign the output.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.index == 0 {
            self.flush_buffer()?;
        }
        self.sink.flush()
    }

    /// Completes the encoding: writes back any partial radix, emits
    /// the terminators called for by the configuration and flushes the
    /// buffer. When the coding is not terminated the close is
    /// forwarded to the sink; a terminated stream is self-delimited
    /// and leaves the sink open so the caller may append further
    /// content. Closing is idempotent; subsequent writes fail.
    pub fn close(&mut self) -> io::Result<()> {
        if self.stage == Stage::Closed {
            return Ok(());
        }
        // write back the radix
        if self.index != 0 {
            self.buffer[self.position - self.index as usize - 1] =
                self.coding.mapping().char_at(self.radix);
        }
        if self.coding.is_terminated() {
            // write() never leaves the buffer full, so there is space
            self.buffer[self.position] = self.coding.terminator();
            self.position += 1;
            if self.stage == Stage::RadixFree {
                // a second terminator marks the end of the (entirely
                // radix-free) stream unambiguously
                self.flush_buffer_with_term()?;
            } else {
                self.flush_buffer()?;
            }
            // the sink stays open when termination is explicit
        } else {
            // for implicit termination the close is forwarded
            self.flush_buffer()?;
            self.sink.close()?;
        }
        self.stage = Stage::Closed;
        Ok(())
    }

    /// Closes the writer and returns the sink.
    pub fn finish(mut self) -> io::Result<S> {
        self.close()?;
        Ok(self.sink)
    }

    fn flush_buffer_with_term(&mut self) -> io::Result<()> {
        // unlucky case: the buffer is full and must be flushed twice
        if self.position == self.buffer.len() {
            self.flush_buffer()?;
        }
        self.buffer[self.position] = self.coding.terminator();
        self.position += 1;
        self.flush_buffer()
    }

    /// Always called with a completed triple, except when closing, in
    /// which case the partial radix has already been written back.
    fn flush_buffer(&mut self) -> io::Result<()> {
        if self.position == 0 {
            return Ok(());
        }
        match self.write_out() {
            Ok(()) => {
                self.position = 0;
                Ok(())
            }
            Err(err) => {
                // a failed sink leaves the output undefined
                self.stage = Stage::Closed;
                Err(err)
            }
        }
    }

    fn write_out(&mut self) -> io::Result<()> {
        let line_length = self.coding.line_length();
        if line_length == 0 {
            return self.sink.write_chunk(&self.buffer[..self.position]);
        }
        // split on line boundaries; `count` carries the column across
        // flushes and a break is only emitted once the next character
        // arrives, so no trailing break is produced
        let offset = (self.count % line_length as u64) as usize;
        let mut start = if offset == 0 && self.count != 0 {
            0
        } else {
            line_length - offset
        };
        let mut last = 0;
        while start < self.position {
            self.sink.write_chunk(&self.buffer[last..start])?;
            self.sink.write_line_break(self.coding.line_break())?;
            last = start;
            start += line_length;
        }
        self.sink.write_chunk(&self.buffer[last..self.position])?;
        self.count += self.position as u64;
        Ok(())
    }
}

impl<S: EncodedSink> io::Write for Radix4Writer<'_, S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &b in buf {
            self.write_byte(b)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Radix4Writer::flush(self)
    }
}
