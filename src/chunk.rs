//! Chunk Definitions for parsed types and type headers

use header::HeaderChunk;
use track::TrackChunk;

use crate::{
    chunk::chunk_types::{HEADER_CHUNK, TRACK_DATA_CHUNK},
    error::{ErrorKind, ParseError, ParseResult, ValidationError},
    reader::MidiCursor,
    writer::MidiWriteable,
    Chunk,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod chunk_types;
pub mod header;
pub mod track;

/// Represents a parsed MIDI Chunk with its associated data.
/// A parsed chunk is classified based on its type, such as header or track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParsedChunk {
    /// A header chunk
    Header(HeaderChunk),
    /// A track chunk,
    Track(TrackChunk),
}

impl ParsedChunk {
    /// Reads the next chunk, dispatching on its tag
    pub fn read(cursor: &mut MidiCursor<'_>) -> ParseResult<Self> {
        let tag_position = cursor.position();
        let chunk = Chunk::read(cursor)?;

        match chunk.chunk_type {
            HEADER_CHUNK => Ok(ParsedChunk::Header(HeaderChunk::decode(chunk, cursor)?)),
            TRACK_DATA_CHUNK => Ok(ParsedChunk::Track(TrackChunk::decode_body(chunk, cursor)?)),
            other => Err(ParseError::new(
                tag_position,
                ErrorKind::UnknownChunkTag(other),
            )),
        }
    }
}

impl TryFrom<&ParsedChunk> for (Chunk, Vec<u8>) {
    type Error = ValidationError;

    fn try_from(value: &ParsedChunk) -> Result<Self, Self::Error> {
        let (chunk_type, bytes) = match value {
            ParsedChunk::Header(header) => (HEADER_CHUNK, header.to_midi_bytes()),
            ParsedChunk::Track(track) => (TRACK_DATA_CHUNK, track.payload_bytes()),
        };

        Ok((Chunk::for_payload(chunk_type, bytes.len())?, bytes))
    }
}

impl ParsedChunk {
    /// The framed chunk. Fails if the payload does not fit a 32 bit length
    pub fn to_midi_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        <(Chunk, Vec<u8>)>::try_from(self).map(|framed| framed.to_midi_bytes())
    }
}
