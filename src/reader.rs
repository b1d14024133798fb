//! Sequential big-endian reader over an in-memory MIDI byte span

use crate::error::{ErrorKind, ParseError, ParseResult};

/// A read position over a borrowed byte buffer.
///
/// Cursors can be narrowed to a bounded region with [`MidiCursor::sub_cursor`]; positions
/// reported by a narrowed cursor are still absolute offsets into the original buffer, so
/// errors always point at the right byte.
#[derive(Debug, Clone)]
pub struct MidiCursor<'a> {
    /// The bytes visible to this cursor
    data: &'a [u8],
    /// Read position relative to `data`
    offset: usize,
    /// Absolute position of `data[0]` in the original buffer
    base: usize,
}

impl<'a> MidiCursor<'a> {
    /// Creates a cursor at the start of `data`
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    /// Absolute byte offset of the next read
    pub fn position(&self) -> usize {
        self.base + self.offset
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// True once every byte has been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Builds an error located at the current position
    pub fn error(&self, kind: ErrorKind) -> ParseError {
        ParseError::new(self.position(), kind)
    }

    /// Returns the next byte without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Reads a single byte
    pub fn read_u8(&mut self) -> ParseResult<u8> {
        let byte = self
            .peek_u8()
            .ok_or_else(|| self.error(ErrorKind::TruncatedChunk))?;
        self.offset += 1;
        Ok(byte)
    }

    /// Reads a big-endian 16 bit integer
    pub fn read_u16(&mut self) -> ParseResult<u16> {
        let bytes = self.read_array::<2>()?;
        Ok(u16::from_be_bytes(bytes))
    }

    /// Reads a big-endian 32 bit integer
    pub fn read_u32(&mut self) -> ParseResult<u32> {
        let bytes = self.read_array::<4>()?;
        Ok(u32::from_be_bytes(bytes))
    }

    /// Reads a fixed number of bytes into an array
    pub fn read_array<const N: usize>(&mut self) -> ParseResult<[u8; N]> {
        let mut array = [0; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    /// Reads `n` bytes as a borrowed slice
    pub fn read_bytes(&mut self, n: usize) -> ParseResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(self.error(ErrorKind::TruncatedChunk));
        }

        let data = self.data;
        let bytes = &data[self.offset..self.offset + n];
        self.offset += n;
        Ok(bytes)
    }

    /// Advances past `n` bytes
    pub fn skip(&mut self, n: usize) -> ParseResult<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Splits off the next `len` bytes as a bounded cursor and advances past them
    pub fn sub_cursor(&mut self, len: usize) -> ParseResult<MidiCursor<'a>> {
        let base = self.position();
        let data = self.read_bytes(len)?;

        Ok(MidiCursor {
            data,
            offset: 0,
            base,
        })
    }

    /// All bytes not yet consumed
    pub fn rest(&self) -> &'a [u8] {
        let data = self.data;
        &data[self.offset..]
    }
}
