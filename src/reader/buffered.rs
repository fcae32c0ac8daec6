//! Buffered Reader
//!
//! Reads markup from any source implementing Read, keeping only the bytes
//! that have not been consumed yet.

use std::io::{ErrorKind, Read};

/// Buffer size for reading chunks
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Buffered reader for streaming input
pub struct BufferedReader<R: Read> {
    reader: R,
    buffer: Vec<u8>,
    pos: usize,
    end: usize,
    eof: bool,
    /// Bytes consumed before `buffer[pos]`
    consumed: u64,
}

impl<R: Read> BufferedReader<R> {
    pub fn new(reader: R) -> Self {
        Self::with_capacity(reader, DEFAULT_BUFFER_SIZE)
    }

    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        BufferedReader {
            reader,
            buffer: vec![0u8; capacity.max(16)],
            pos: 0,
            end: 0,
            eof: false,
            consumed: 0,
        }
    }

    /// Read more bytes from the source, keeping unconsumed data
    ///
    /// Returns `Ok(false)` once the source is exhausted. The buffer doubles
    /// when a single unconsumed run already fills it.
    pub fn fill_buffer(&mut self) -> std::io::Result<bool> {
        if self.eof {
            return Ok(false);
        }

        // Compact: move remaining data to start
        if self.pos > 0 {
            self.buffer.copy_within(self.pos..self.end, 0);
            self.end -= self.pos;
            self.pos = 0;
        }

        if self.end == self.buffer.len() {
            let grown = self.buffer.len() * 2;
            self.buffer.resize(grown, 0);
        }

        loop {
            match self.reader.read(&mut self.buffer[self.end..]) {
                Ok(0) => {
                    self.eof = true;
                    return Ok(false);
                }
                Ok(read) => {
                    self.end += read;
                    return Ok(true);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Get current buffered data as a slice
    #[inline]
    pub fn buffered(&self) -> &[u8] {
        &self.buffer[self.pos..self.end]
    }

    /// Whether the source has reported end of input (data may remain buffered)
    #[inline]
    pub fn source_exhausted(&self) -> bool {
        self.eof
    }

    /// Consume n bytes from the buffer
    #[inline]
    pub fn consume(&mut self, n: usize) {
        let n = n.min(self.end - self.pos);
        self.pos += n;
        self.consumed += n as u64;
    }

    /// Stream offset of the first buffered byte
    #[inline]
    pub fn offset(&self) -> u64 {
        self.consumed
    }

    /// Current allocated buffer size
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
