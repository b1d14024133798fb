//! Header Chunk Enum and Struct Definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorKind, ParseError, ParseResult},
    reader::MidiCursor,
    writer::MidiWriteable,
    Chunk,
};

/// Length of a well formed header chunk payload
pub const HEADER_LENGTH: usize = 6;

/// Header chunk data, including format, ntrks and division as 3 16 bit unsigned integers
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HeaderChunk {
    /// The MIDI format
    format: Format,
    /// Number of tracks
    ntrks: u16,
    /// Time signature/division
    division: Division,
}

impl HeaderChunk {
    /// Creates a header from its parts
    pub fn new(format: Format, ntrks: u16, division: Division) -> Self {
        Self {
            format,
            ntrks,
            division,
        }
    }

    /// The file organization
    pub fn format(&self) -> Format {
        self.format
    }

    /// Number of track chunks the header announces
    pub fn ntrks(&self) -> u16 {
        self.ntrks
    }

    /// How delta times map to wall clock time
    pub fn division(&self) -> Division {
        self.division
    }

    /// Decodes the payload of an `MThd` chunk whose tag and length were already read.
    ///
    /// A declared length other than 6 is tolerated: six bytes are always read and any extra
    /// declared bytes are skipped.
    pub fn decode(chunk: Chunk, cursor: &mut MidiCursor<'_>) -> ParseResult<Self> {
        if chunk.len() != HEADER_LENGTH {
            log::warn!(
                "Header chunk declares {} bytes, expected {HEADER_LENGTH}",
                chunk.len()
            );
        }

        let mut body = cursor.sub_cursor(chunk.len().max(HEADER_LENGTH))?;

        let format_position = body.position();
        let format = body.read_u16()?;
        let ntrks = body.read_u16()?;
        let division = body.read_u16()?;

        let format = Format::try_from(format).map_err(|InvalidFormat(raw)| {
            ParseError::new(format_position, ErrorKind::UnsupportedFormat(raw))
        })?;

        Ok(Self {
            format,
            ntrks,
            division: division.into(),
        })
    }
}

impl MidiWriteable for HeaderChunk {
    fn to_midi_bytes(&self) -> Vec<u8> {
        let mut bytes = self.format.to_midi_bytes();
        bytes.extend(self.ntrks.to_midi_bytes());
        bytes.extend(self.division.to_midi_bytes());

        bytes
    }
}

/// The overall organization of the MIDI file. Only three values are valid, making most of the 16
/// bits irrelevant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Format {
    /// The file contains a single multi-channel track
    Zero,
    /// The file contains one or more simultaneous tracks (or MIDI outputs) of a sequence
    One,
    /// The file contains one or more sequentially independent single-track patterns
    Two,
}

impl Format {
    /// The format the writer uses for a given number of tracks
    pub fn for_track_count(count: usize) -> Self {
        if count == 1 {
            Format::Zero
        } else {
            Format::One
        }
    }
}

impl MidiWriteable for Format {
    fn to_midi_bytes(&self) -> Vec<u8> {
        u16::from(*self).to_midi_bytes()
    }
}

impl From<Format> for u16 {
    fn from(value: Format) -> Self {
        match value {
            Format::Zero => 0,
            Format::One => 1,
            Format::Two => 2,
        }
    }
}

/// Error struct representing an invalid format specifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidFormat(pub u16);

impl TryFrom<u16> for Format {
    type Error = InvalidFormat;
    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Format::Zero),
            1 => Ok(Format::One),
            2 => Ok(Format::Two),
            other => Err(InvalidFormat(other)),
        }
    }
}

/// The meaning of the delta-times in the MIDI sequence,
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Division {
    /// When bit 15 is a 0, bits 14-0 represent ticks per quarter note
    Metrical(u16),
    /// When bit 15 is 1, the upper byte is the negative SMPTE format,
    /// and bits 7-0 represent ticks per frame
    TimeCodeBased(SmpteTicks),
}

/// Division defined by time-code-based time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SmpteTicks {
    /// Negative frames per second, as stored in the upper byte
    smpte: i8,
    /// 8 bits of ticks per frame
    tpf: u8,
}

impl SmpteTicks {
    /// Creates a time code division from a frame rate (24, 25, 29 or 30) and ticks per frame
    pub fn new(fps: u8, tpf: u8) -> Self {
        Self {
            smpte: -((fps & 0x7F) as i8),
            tpf,
        }
    }

    /// The raw signed frame rate byte
    pub fn smpte(&self) -> i8 {
        self.smpte
    }

    /// Frames per second, 29 meaning 29.97 drop frame
    pub fn fps(&self) -> u8 {
        self.smpte.unsigned_abs()
    }

    /// Ticks per frame
    pub fn tpf(&self) -> u8 {
        self.tpf
    }

    /// Frames per second as a rate
    pub fn fps_f64(&self) -> f64 {
        match self.fps() {
            29 => 30_000.0 / 1_001.0,
            fps => fps as f64,
        }
    }
}

impl MidiWriteable for SmpteTicks {
    fn to_midi_bytes(&self) -> Vec<u8> {
        const MASK: u8 = 0x80;
        let smpte = self.smpte.to_be_bytes()[0] | MASK;

        vec![smpte, self.tpf]
    }
}

impl From<u16> for Division {
    fn from(value: u16) -> Self {
        const MASK: u16 = 0x7FFF;

        if value >> 15 == 0 {
            return Division::Metrical(value & MASK);
        }

        let [high, tpf] = value.to_be_bytes();
        Division::TimeCodeBased(SmpteTicks {
            smpte: high as i8,
            tpf,
        })
    }
}

impl MidiWriteable for Division {
    fn to_midi_bytes(&self) -> Vec<u8> {
        match self {
            Self::Metrical(metrical) => (metrical & 0x7FFF).to_midi_bytes(),
            Self::TimeCodeBased(smpte) => smpte.to_midi_bytes(),
        }
    }
}
