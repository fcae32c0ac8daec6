//! Incremental JSON array output
//!
//! [`JsonArrayWriter`] writes array elements one at a time and produces the
//! same bytes `serde_json::to_writer` (or `to_writer_pretty`) would for the
//! whole collection, so callers never have to hold it in memory.

use crate::error::Result;
use memchr::memchr_iter;
use serde::Serialize;
use std::io::Write;

const PRETTY_INDENT: &[u8] = b"  ";

/// Streams values into a single JSON array
pub struct JsonArrayWriter<W: Write> {
    writer: W,
    pretty: bool,
    count: u64,
    /// Reused per-element buffer for pretty output
    scratch: Vec<u8>,
}

impl<W: Write> JsonArrayWriter<W> {
    /// Open the array
    pub fn new(mut writer: W, pretty: bool) -> Result<Self> {
        writer.write_all(b"[")?;
        Ok(JsonArrayWriter {
            writer,
            pretty,
            count: 0,
            scratch: Vec::new(),
        })
    }

    /// Elements written so far
    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn write<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        if self.pretty {
            self.write_pretty(value)?;
        } else {
            if self.count > 0 {
                self.writer.write_all(b",")?;
            }
            serde_json::to_writer(&mut self.writer, value)?;
        }
        self.count += 1;
        Ok(())
    }

    // Each element is rendered standalone and shifted one level right.
    // Encoded strings never contain a raw newline.
    fn write_pretty<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        self.scratch.clear();
        serde_json::to_writer_pretty(&mut self.scratch, value)?;

        if self.count > 0 {
            self.writer.write_all(b",")?;
        }
        self.writer.write_all(b"\n")?;
        self.writer.write_all(PRETTY_INDENT)?;

        let mut start = 0;
        for newline in memchr_iter(b'\n', &self.scratch) {
            self.writer.write_all(&self.scratch[start..=newline])?;
            self.writer.write_all(PRETTY_INDENT)?;
            start = newline + 1;
        }
        self.writer.write_all(&self.scratch[start..])?;
        Ok(())
    }

    /// Close the array and hand back the flushed writer
    pub fn finish(mut self) -> Result<W> {
        if self.pretty && self.count > 0 {
            self.writer.write_all(b"\n")?;
        }
        self.writer.write_all(b"]")?;
        self.writer.flush()?;
        Ok(self.writer)
    }
}
