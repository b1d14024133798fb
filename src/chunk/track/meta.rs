//! Meta Event Structs and Parsing

use crate::{
    error::{ErrorKind, ParseError, ParseResult, ValidationError},
    reader::MidiCursor,
    vlq,
    writer::MidiWriteable,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Status byte introducing every meta event
pub const META_PREFIX: u8 = 0xFF;

/// A meta level event
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetaEvent {
    /// Sequence Number, tag 0x00
    SequenceNumber(u16),
    /// Text metadata, tag 0x01
    Text(String),
    /// Copyright, tag 0x02
    Copyright(String),
    /// Sequence or track name, tag 0x03
    TrackName(String),
    /// Instrument name, tag 0x04
    InstrumentName(String),
    /// Lyric, tag 0x05
    Lyric(String),
    /// Marker, tag 0x06
    Marker(String),
    /// Cue Point, tag 0x07
    CuePoint(String),
    /// Midi Channel Prefix, tag 0x20
    MidiChannelPrefix(u8),
    /// Midi Port, tag 0x21
    MidiPort(u8),
    /// End of Track Identifier, tag 0x2F
    EndOfTrack,
    /// Tempo in microseconds per quarter note, tag 0x51
    Tempo(u32),
    /// Smpte Offset, tag 0x54
    SmpteOffset(SmpteOffset),
    /// Time signature, tag 0x58
    TimeSignature(TimeSignature),
    /// Key Signature, tag 0x59
    KeySignature(KeySignature),
    /// Sequencer Specific, tag 0x7f
    SequencerSpecific(SequencerSpecific),
    /// An unknown meta event
    UnknownRaw(u8, Vec<u8>),
}

impl MetaEvent {
    /// Returns the specific event's tag
    pub fn get_tag(&self) -> u8 {
        match self {
            Self::SequenceNumber(_) => 0x00,
            Self::Text(_) => 0x01,
            Self::Copyright(_) => 0x02,
            Self::TrackName(_) => 0x03,
            Self::InstrumentName(_) => 0x04,
            Self::Lyric(_) => 0x05,
            Self::Marker(_) => 0x06,
            Self::CuePoint(_) => 0x07,
            Self::MidiChannelPrefix(_) => 0x20,
            Self::MidiPort(_) => 0x21,
            Self::EndOfTrack => 0x2F,
            Self::Tempo(_) => 0x51,
            Self::SmpteOffset(_) => 0x54,
            Self::TimeSignature(_) => 0x58,
            Self::KeySignature(_) => 0x59,
            Self::SequencerSpecific(_) => 0x7F,
            Self::UnknownRaw(tag, _) => *tag,
        }
    }

    /// Human readable event name, `None` for unrecognized tags
    pub fn name(&self) -> Option<&'static str> {
        let name = match self {
            Self::SequenceNumber(_) => "Sequence Number",
            Self::Text(_) => "Text",
            Self::Copyright(_) => "Copyright Notice",
            Self::TrackName(_) => "Sequence/Track Name",
            Self::InstrumentName(_) => "Instrument Name",
            Self::Lyric(_) => "Lyric",
            Self::Marker(_) => "Marker",
            Self::CuePoint(_) => "Cue Point",
            Self::MidiChannelPrefix(_) => "MIDI Channel Prefix",
            Self::MidiPort(_) => "MIDI Port",
            Self::EndOfTrack => "End of Track",
            Self::Tempo(_) => "Set Tempo",
            Self::SmpteOffset(_) => "SMPTE Offset",
            Self::TimeSignature(_) => "Time Signature",
            Self::KeySignature(_) => "Key Signature",
            Self::SequencerSpecific(_) => "Sequencer-Specific Meta-event",
            Self::UnknownRaw(..) => return None,
        };

        Some(name)
    }

    /// The text of the seven text event types
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text)
            | Self::Copyright(text)
            | Self::TrackName(text)
            | Self::InstrumentName(text)
            | Self::Lyric(text)
            | Self::Marker(text)
            | Self::CuePoint(text) => Some(text),
            _ => None,
        }
    }

    /// Checks values that the wire format cannot hold
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Tempo(tempo) if *tempo > 0xFF_FFFF => {
                Err(ValidationError::TempoOutOfRange(*tempo))
            }
            _ => match self.text() {
                Some(text) if text.chars().any(|c| c as u32 > 0xFF) => {
                    Err(ValidationError::TextNotEncodable)
                }
                _ => Ok(()),
            },
        }
    }

    /// Decodes the type, length and payload following a 0xFF byte that was already consumed
    pub fn decode(cursor: &mut MidiCursor<'_>) -> ParseResult<Self> {
        let event_tag = cursor.read_u8()?;
        let length = vlq::decode(cursor)?;
        let payload_position = cursor.position();
        let data = cursor.read_bytes(length as usize)?;

        macro_rules! meta_event {
            ($len: expr, $value: expr) => {{
                if length != $len {
                    return Err(ParseError::new(
                        payload_position,
                        ErrorKind::MetaEventLengthMismatch {
                            meta_type: event_tag,
                            expected: $len,
                            actual: length,
                        },
                    ));
                }
                Ok($value)
            }};
        }

        match event_tag {
            0x00 => meta_event!(
                2,
                MetaEvent::SequenceNumber(u16::from_be_bytes([data[0], data[1]]))
            ),
            0x01 => Ok(MetaEvent::Text(read_text(data))),
            0x02 => Ok(MetaEvent::Copyright(read_text(data))),
            0x03 => Ok(MetaEvent::TrackName(read_text(data))),
            0x04 => Ok(MetaEvent::InstrumentName(read_text(data))),
            0x05 => Ok(MetaEvent::Lyric(read_text(data))),
            0x06 => Ok(MetaEvent::Marker(read_text(data))),
            0x07 => Ok(MetaEvent::CuePoint(read_text(data))),

            0x20 => meta_event!(1, MetaEvent::MidiChannelPrefix(data[0])),
            0x21 => meta_event!(1, MetaEvent::MidiPort(data[0])),
            0x2F => meta_event!(0, MetaEvent::EndOfTrack),

            0x51 => meta_event!(
                3,
                MetaEvent::Tempo(u32::from_be_bytes([0, data[0], data[1], data[2]]))
            ),
            0x54 => meta_event!(
                5,
                MetaEvent::SmpteOffset(SmpteOffset {
                    hours: data[0],
                    minutes: data[1],
                    seconds: data[2],
                    frames: data[3],
                    subframes: data[4]
                })
            ),
            0x58 => meta_event!(
                4,
                MetaEvent::TimeSignature(TimeSignature {
                    numerator: data[0],
                    denominator_exponent: data[1],
                    clocks_per_tick: data[2],
                    thirty_second_notes_per_quarter: data[3],
                })
            ),
            0x59 => meta_event!(
                2,
                MetaEvent::KeySignature(KeySignature {
                    sharps_flats: data[0] as i8,
                    minor: data[1] != 0
                })
            ),

            0x7F => SequencerSpecific::parse(data)
                .map(MetaEvent::SequencerSpecific)
                .map_err(|expected| {
                    ParseError::new(
                        payload_position,
                        ErrorKind::MetaEventLengthMismatch {
                            meta_type: event_tag,
                            expected,
                            actual: length,
                        },
                    )
                }),

            _ => Ok(MetaEvent::UnknownRaw(event_tag, data.to_vec())),
        }
    }
}

/// Text payloads are single byte characters; each byte maps to the char of the same value
fn read_text(data: &[u8]) -> String {
    data.iter().map(|&byte| byte as char).collect()
}

/// Inverse of [`read_text`]. Characters above 0xFF cannot be represented and are written as `?`
fn write_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(c).unwrap_or(b'?'))
        .collect()
}

impl MidiWriteable for MetaEvent {
    fn to_midi_bytes(&self) -> Vec<u8> {
        let tag_byte = self.get_tag();
        let mut bytes = vec![META_PREFIX, tag_byte];

        let payload_bytes = match self {
            Self::SequenceNumber(val) => val.to_midi_bytes(),
            Self::Text(val)
            | Self::Copyright(val)
            | Self::TrackName(val)
            | Self::InstrumentName(val)
            | Self::Lyric(val)
            | Self::Marker(val)
            | Self::CuePoint(val) => write_text(val),
            Self::MidiChannelPrefix(val) | Self::MidiPort(val) => val.to_midi_bytes(),
            Self::EndOfTrack => vec![],
            Self::Tempo(val) => val.to_midi_bytes()[1..].to_vec(),
            Self::SmpteOffset(val) => val.to_midi_bytes(),
            Self::TimeSignature(val) => val.to_midi_bytes(),
            Self::KeySignature(val) => val.to_midi_bytes(),
            Self::SequencerSpecific(val) => val.to_midi_bytes(),
            Self::UnknownRaw(_, val) => val.clone(),
        };

        bytes.extend(vlq::encode(payload_bytes.len() as u32));
        bytes.extend(payload_bytes);

        bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// A key signature
pub struct KeySignature {
    /// Negative for flats, positive for sharps
    pub sharps_flats: i8,
    /// True if in minor, false if in major
    pub minor: bool,
}

impl MidiWriteable for KeySignature {
    fn to_midi_bytes(&self) -> Vec<u8> {
        let mut bytes = self.sharps_flats.to_midi_bytes();
        bytes.push(self.minor as u8);

        bytes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// An SMPTE Offset
pub struct SmpteOffset {
    /// Hours of offset
    pub hours: u8,
    /// Minutes of offset
    pub minutes: u8,
    /// Seconds of offset
    pub seconds: u8,
    /// Frames of offset
    pub frames: u8,
    /// Fractional frames, in hundredths of a frame
    pub subframes: u8,
}

impl MidiWriteable for SmpteOffset {
    fn to_midi_bytes(&self) -> Vec<u8> {
        vec![
            self.hours,
            self.minutes,
            self.seconds,
            self.frames,
            self.subframes,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
/// A Time Signature
pub struct TimeSignature {
    /// The time signature's numerator
    pub numerator: u8,
    /// The denominator as a power of two
    pub denominator_exponent: u8,
    /// MIDI clocks per metronome tick
    pub clocks_per_tick: u8,
    /// Thirty second notes per quarter
    pub thirty_second_notes_per_quarter: u8,
}

impl TimeSignature {
    /// The denominator as a note value, `None` if it overflows
    pub fn denominator(&self) -> Option<u32> {
        2u32.checked_pow(self.denominator_exponent as u32)
    }
}

impl MidiWriteable for TimeSignature {
    fn to_midi_bytes(&self) -> Vec<u8> {
        vec![
            self.numerator,
            self.denominator_exponent,
            self.clocks_per_tick,
            self.thirty_second_notes_per_quarter,
        ]
    }
}

/// A manufacturer's ID. Can be either a 1 byte variant or 3 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ManufacturerId {
    /// One byte ID
    OneByte(u8),
    /// Three byte ID, the first byte is always 0x00
    ThreeByte([u8; 3]),
}

impl MidiWriteable for ManufacturerId {
    fn to_midi_bytes(&self) -> Vec<u8> {
        match self {
            Self::OneByte(id) => vec![*id],
            Self::ThreeByte(id) => id.to_vec(),
        }
    }
}

/// Payload of a sequencer specific meta event
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SequencerSpecific {
    /// Manufacturer prefix, absent when the payload is empty
    pub manufacturer_id: Option<ManufacturerId>,
    /// Opaque bytes after the id
    pub data: Vec<u8>,
}

impl SequencerSpecific {
    /// Splits the manufacturer id from the payload, returning the minimum length on failure
    fn parse(payload: &[u8]) -> Result<Self, u32> {
        let (manufacturer_id, data) = match payload {
            [] => (None, payload),
            [0x00, second, third, rest @ ..] => {
                (Some(ManufacturerId::ThreeByte([0x00, *second, *third])), rest)
            }
            [0x00, ..] => return Err(3),
            [id, rest @ ..] => (Some(ManufacturerId::OneByte(*id)), rest),
        };

        Ok(Self {
            manufacturer_id,
            data: data.to_vec(),
        })
    }
}

impl MidiWriteable for SequencerSpecific {
    fn to_midi_bytes(&self) -> Vec<u8> {
        let mut bytes = self
            .manufacturer_id
            .map(|id| id.to_midi_bytes())
            .unwrap_or_default();
        bytes.extend(self.data.iter());

        bytes
    }
}
