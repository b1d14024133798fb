//! # smfcodec
//!
//! An in-memory Standard MIDI File codec. Bytes go in, a timed event model comes out, and the
//! model (or a list of hand-built tracks) can be written back to bytes.
//!
//! ## Overview
//!
//! MIDI files are structured as a series of chunks. Each chunk contains a 4-character ASCII
//! type identifier and a 32-bit length that specifies how many bytes of data follow. The first
//! chunk is always the `MThd` header, followed by one `MTrk` chunk per track. Track chunks hold
//! channel, meta and sysex events, each prefixed by a variable-length delta time in ticks.
//!
//! Decoding resolves every event's absolute offset in microseconds, following the tempo changes
//! found in its track.
//!
//! - **Minimal dependencies**: only `thiserror` and the `log` facade by default, with opt in
//!   serde support
//! - **No I/O**: everything operates over byte slices, callers own reading and writing files
//!
//! ## Example Usage
//!
//! ```rust
//! use smfcodec::{
//!     chunk::track::{channel::Command, builder::EventBuilder},
//!     file::Track,
//! };
//!
//! let mut track = Track::new();
//! track.push(
//!     EventBuilder::channel_event(Command::NoteOn)
//!         .on_channel(0)
//!         .key(60)
//!         .velocity(100)
//!         .delta_time(0)
//!         .build()
//!         .expect("Complete NoteOn"),
//! );
//! track.push(
//!     EventBuilder::channel_event(Command::NoteOff)
//!         .on_channel(0)
//!         .key(60)
//!         .velocity(0)
//!         .delta_time(480)
//!         .build()
//!         .expect("Complete NoteOff"),
//! );
//!
//! let bytes = smfcodec::encode(&[track]).expect("One track fits the header");
//! let file = smfcodec::decode(&bytes).expect("Decode what was just encoded");
//!
//! assert_eq!(file.track_count(), 1);
//! assert_eq!(file.duration(), 2_000_000.0);
//! assert_eq!(file.to_midi_bytes(), Ok(bytes));
//! ```
//!
//! ## Library Structure
//!
//! - **[`chunk`]**: Header and track chunk codecs, including every event family.
//! - **[`file`]**: The decoded [`MidiFile`] model, the [`Sequence`] write path and the
//!   [`decode`]/[`encode`] entry points.
//! - **[`timing`]**: Converts tick deltas into absolute microsecond offsets.
//! - **[`names`]**: Applies caller supplied name tables to channel events.
//! - **[`reader`]** and **[`writer`]**: The byte cursor and the [`writer::MidiWriteable`] trait.
//! - **[`vlq`]**: Variable-length quantity codec.

pub mod chunk;
pub mod error;
pub mod file;
pub mod names;
pub mod reader;
pub mod timing;
pub mod vlq;
pub mod writer;

pub use error::{ErrorKind, ParseError, ParseResult, ValidationError};
pub use file::{decode, encode, MidiFile, Sequence, Track};

use chunk::chunk_types::TAG_LENGTH;
use reader::MidiCursor;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Represents a raw MIDI Chunk.
/// A MIDI Chunk consists of a 4-character ASCII type identifier and a 32-bit unsigned integer specifying the length of its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chunk {
    /// 4 character ASCII chunk type
    pub chunk_type: [u8; TAG_LENGTH],
    /// Length of the data that follows
    length: u32,
}

impl Chunk {
    /// Creates chunk framing for `length` bytes of data
    pub const fn new(chunk_type: [u8; TAG_LENGTH], length: u32) -> Self {
        Self { chunk_type, length }
    }

    /// Framing for a payload of `len` bytes, if the length fits the 32 bit field
    pub fn for_payload(chunk_type: [u8; TAG_LENGTH], len: usize) -> Result<Self, ValidationError> {
        let length = u32::try_from(len).map_err(|_| ValidationError::ChunkTooLong(len))?;

        Ok(Self { chunk_type, length })
    }

    /// Reads a chunk tag and its big endian length
    pub fn read(cursor: &mut MidiCursor<'_>) -> ParseResult<Self> {
        if cursor.remaining() < TAG_LENGTH + 4 {
            return Err(cursor.error(ErrorKind::TruncatedChunk));
        }

        let chunk_type = cursor.read_array()?;
        let length = cursor.read_u32()?;

        Ok(Self { chunk_type, length })
    }

    /// Gets the length of the chunk as a usize
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Returns if the chunk has no attributed data
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The chunk tag as text, for messages
    pub fn tag(&self) -> String {
        self.chunk_type.iter().map(|&b| b as char).collect()
    }
}

impl From<u64> for Chunk {
    fn from(value: u64) -> Self {
        let [a, b, c, d, length @ ..] = value.to_be_bytes();

        Self {
            chunk_type: [a, b, c, d],
            length: u32::from_be_bytes(length),
        }
    }
}
