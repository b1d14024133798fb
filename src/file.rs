//! Whole file decoding and encoding

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    chunk::{
        chunk_types::{HEADER_CHUNK, TRACK_DATA_CHUNK},
        header::{Division, Format, HeaderChunk, HEADER_LENGTH},
        track::TrackChunk,
        ParsedChunk,
    },
    error::{ErrorKind, ParseError, ParseResult, ValidationError},
    reader::MidiCursor,
    timing, Chunk,
};

/// Ticks per quarter note written by [`encode`] and [`Sequence`]
pub const WRITE_DIVISION: u16 = 120;

/// An ordered list of events, owned by a file or by a sequence being built
pub type Track = TrackChunk;

/// A non-fatal finding made while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Diagnostic {
    /// The header chunk declared a length other than 6
    HeaderLengthMismatch {
        /// The declared length
        declared: u32,
    },
    /// Bytes were left over after the announced number of tracks
    TrailingBytes {
        /// Where the unread bytes start
        offset: usize,
        /// How many bytes were left unread
        len: usize,
    },
}

/// A decoded MIDI file with every event's absolute offset resolved
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MidiFile {
    /// The header chunk
    header: HeaderChunk,
    /// Track chunks in file order
    tracks: Vec<Track>,
    /// Largest event offset across all tracks, in microseconds
    duration: f64,
    /// Non-fatal findings of the decode
    diagnostics: Vec<Diagnostic>,
}

impl MidiFile {
    /// The decoded header
    pub fn header(&self) -> &HeaderChunk {
        &self.header
    }

    /// The file organization
    pub fn format(&self) -> Format {
        self.header.format()
    }

    /// Number of tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// How delta times map to wall clock time
    pub fn division(&self) -> Division {
        self.header.division()
    }

    /// Tracks in file order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Offset of the last event of the longest track, in microseconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Everything unusual that did not stop the decode
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Gives up the tracks, for editing and re-encoding
    pub fn into_tracks(self) -> Vec<Track> {
        self.tracks
    }

    /// Writes the file back with its own format and division
    pub fn to_midi_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        write_chunks(self.header.format(), self.header.division(), &self.tracks)
    }
}

/// Decodes a complete MIDI file held in memory.
///
/// The buffer must open with an `MThd` chunk, followed by as many `MTrk` chunks as the header
/// announces. Anything after the last track is reported through [`MidiFile::diagnostics`].
pub fn decode(bytes: &[u8]) -> ParseResult<MidiFile> {
    let mut cursor = MidiCursor::new(bytes);
    let mut diagnostics = vec![];

    let tag_position = cursor.position();
    let chunk = Chunk::read(&mut cursor)?;

    match chunk.chunk_type {
        HEADER_CHUNK => {}
        TRACK_DATA_CHUNK => {
            return Err(ParseError::new(tag_position, ErrorKind::MissingHeaderChunk))
        }
        other => {
            return Err(ParseError::new(
                tag_position,
                ErrorKind::UnknownChunkTag(other),
            ))
        }
    }

    if chunk.len() != HEADER_LENGTH {
        diagnostics.push(Diagnostic::HeaderLengthMismatch {
            declared: chunk.len() as u32,
        });
    }

    let header = HeaderChunk::decode(chunk, &mut cursor)?;
    log::debug!(
        "Decoded header chunk: format {:?}, {} tracks, division {:?}",
        header.format(),
        header.ntrks(),
        header.division()
    );

    let mut tracks = Vec::with_capacity(header.ntrks() as usize);
    for _ in 0..header.ntrks() {
        tracks.push(TrackChunk::decode(&mut cursor)?);
    }

    if !cursor.is_empty() {
        log::warn!(
            "{} trailing bytes after the last track, starting at byte {}",
            cursor.remaining(),
            cursor.position()
        );
        diagnostics.push(Diagnostic::TrailingBytes {
            offset: cursor.position(),
            len: cursor.remaining(),
        });
    }

    let duration = timing::resolve(&mut tracks, header.division());

    Ok(MidiFile {
        header,
        tracks,
        duration,
        diagnostics,
    })
}

/// Encodes tracks as a complete file.
///
/// The division is always [`WRITE_DIVISION`] ticks per quarter note and the format is 0 for a
/// single track, 1 otherwise. Fails with [`ValidationError::TooManyTracks`] when the count does
/// not fit the header's 16 bit field.
pub fn encode(tracks: &[Track]) -> Result<Vec<u8>, ValidationError> {
    write_chunks(
        Format::for_track_count(tracks.len()),
        Division::Metrical(WRITE_DIVISION),
        tracks,
    )
}

/// Writes the header chunk followed by each track chunk
fn write_chunks(
    format: Format,
    division: Division,
    tracks: &[Track],
) -> Result<Vec<u8>, ValidationError> {
    let ntrks =
        u16::try_from(tracks.len()).map_err(|_| ValidationError::TooManyTracks(tracks.len()))?;
    let header = HeaderChunk::new(format, ntrks, division);

    let mut bytes = ParsedChunk::Header(header).to_midi_bytes()?;
    for track in tracks {
        bytes.extend(track.to_midi_bytes()?);
    }

    Ok(bytes)
}

/// A file being assembled for writing. Owns its tracks exclusively
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sequence {
    /// Tracks in the order they will be written
    tracks: Vec<Track>,
}

impl Sequence {
    /// An empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a track and returns its index
    pub fn add_track(&mut self, track: Track) -> usize {
        self.tracks.push(track);
        self.tracks.len() - 1
    }

    /// Mutable access to a track, for pushing more events
    pub fn track_mut(&mut self, index: usize) -> Option<&mut Track> {
        self.tracks.get_mut(index)
    }

    /// The tracks added so far
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

impl From<Vec<Track>> for Sequence {
    fn from(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }
}

impl Sequence {
    /// Encodes the sequence the way [`encode`] does
    pub fn to_midi_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        encode(&self.tracks)
    }
}
