//! Error types raised while decoding MIDI bytes or constructing events for encoding

use thiserror::Error;

use crate::chunk::track::channel::Command;

/// A fatal decode failure, tagged with the absolute byte offset where it was detected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Decoding failed at byte {position}: {kind}")]
pub struct ParseError {
    /// Offset into the input buffer
    position: usize,
    /// What went wrong
    kind: ErrorKind,
}

impl ParseError {
    /// Creates an error from a position and kind
    pub const fn new(position: usize, kind: ErrorKind) -> Self {
        Self { position, kind }
    }

    /// Returns the byte offset where the error was detected
    pub fn position(&self) -> usize {
        self.position
    }

    /// Returns the error kind
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// True if the input ended before a chunk or event was complete
    pub fn is_truncated(&self) -> bool {
        matches!(self.kind, ErrorKind::TruncatedChunk)
    }
}

/// The kinds of failure a decode can produce
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The buffer ended before a variable length quantity terminated, or the value overflowed
    #[error("Malformed variable length quantity")]
    MalformedVlq,
    /// A chunk carried a tag other than the one expected at that point
    #[error("Unknown chunk tag {0:?}")]
    UnknownChunkTag([u8; 4]),
    /// The buffer does not open with an `MThd` chunk
    #[error("File does not begin with a header chunk")]
    MissingHeaderChunk,
    /// A read would cross the end of the buffer or of the enclosing chunk
    #[error("Reached end of chunk before done parsing")]
    TruncatedChunk,
    /// Status byte is outside every known range and no running status applies
    #[error("Unknown event status byte {0:#04X}")]
    UnknownEventStatusByte(u8),
    /// A fixed size meta event declared the wrong payload length
    #[error("Meta event {meta_type:#04X} expects {expected} bytes but declares {actual}")]
    MetaEventLengthMismatch {
        /// Meta event type byte
        meta_type: u8,
        /// Payload length the type requires
        expected: u32,
        /// Payload length found in the file
        actual: u32,
    },
    /// Header format is not 0, 1 or 2
    #[error("Invalid header format {0}")]
    UnsupportedFormat(u16),
}

/// Result type for decode operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Failures raised while building an event or writing a file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Every event needs a delta time
    #[error("Event requires a delta time")]
    MissingDeltaTime,
    /// A channel event needs a channel
    #[error("Channel events require a channel")]
    MissingChannel,
    /// A field required by the command was not supplied
    #[error("{command:?} requires a {field} value")]
    MissingField {
        /// The command being built
        command: Command,
        /// Name of the missing field
        field: &'static str,
    },
    /// Channels are 0 through 15
    #[error("Channel {0} is out of range")]
    ChannelOutOfRange(u8),
    /// Data bytes must leave the high bit clear
    #[error("Data byte {value} for {field} is out of range")]
    DataByteOutOfRange {
        /// Field name
        field: &'static str,
        /// Offending value
        value: u8,
    },
    /// Pitch bend is a 14 bit value
    #[error("Pitch bend {0} exceeds 14 bits")]
    PitchBendOutOfRange(u16),
    /// Tempo is stored in 24 bits
    #[error("Tempo {0} exceeds 24 bits")]
    TempoOutOfRange(u32),
    /// Sysex payloads led by 0xF0 must include that byte
    #[error("Sysex data does not start with its 0xF0 lead byte")]
    InvalidSysexLead,
    /// Text meta events hold single byte characters only
    #[error("Text contains characters that cannot be written as single bytes")]
    TextNotEncodable,
    /// The header stores the track count in 16 bits
    #[error("{0} tracks cannot be announced in a header chunk")]
    TooManyTracks(usize),
    /// Chunk lengths are stored in 32 bits
    #[error("Chunk payload of {0} bytes exceeds the 32 bit length field")]
    ChunkTooLong(usize),
}
