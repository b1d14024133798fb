//! Track chunk data enums and structs

use channel::ChannelEvent;
use meta::{MetaEvent, META_PREFIX};
use sysex::{SysexEvent, SysexLead, SYSEX_ESCAPE, SYSEX_START};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    chunk::chunk_types::TRACK_DATA_CHUNK,
    error::{ErrorKind, ParseError, ParseResult, ValidationError},
    reader::MidiCursor,
    vlq,
    writer::MidiWriteable,
    Chunk,
};

pub mod builder;
pub mod channel;
pub mod meta;
pub mod sysex;

/// A track chunk, containing one or more MTrk events in file order
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackChunk {
    /// All associated track events to this chunk
    mtrk_events: Vec<MTrkEvent>,
}

impl TrackChunk {
    /// Creates an empty track
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event to the end of the track
    pub fn push(&mut self, event: MTrkEvent) {
        self.mtrk_events.push(event);
    }

    /// The events in file order
    pub fn events(&self) -> &[MTrkEvent] {
        &self.mtrk_events
    }

    /// Mutable access for the timing resolver
    pub(crate) fn events_mut(&mut self) -> &mut [MTrkEvent] {
        &mut self.mtrk_events
    }

    /// Number of events in the track
    pub fn len(&self) -> usize {
        self.mtrk_events.len()
    }

    /// True if the track holds no events
    pub fn is_empty(&self) -> bool {
        self.mtrk_events.is_empty()
    }

    /// The text of the first sequence/track name meta event
    pub fn name(&self) -> Option<&str> {
        self.mtrk_events.iter().find_map(|mtrk| match &mtrk.event {
            Event::MetaEvent(MetaEvent::TrackName(name)) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Decodes an `MTrk` chunk, tag and length included
    pub fn decode(cursor: &mut MidiCursor<'_>) -> ParseResult<Self> {
        let tag_position = cursor.position();
        let chunk = Chunk::read(cursor)?;

        if chunk.chunk_type != TRACK_DATA_CHUNK {
            return Err(ParseError::new(
                tag_position,
                ErrorKind::UnknownChunkTag(chunk.chunk_type),
            ));
        }

        Self::decode_body(chunk, cursor)
    }

    /// Decodes the events of a track whose framing was already read.
    ///
    /// Exactly `chunk.len()` bytes are consumed; running status starts empty for every track.
    pub fn decode_body(chunk: Chunk, cursor: &mut MidiCursor<'_>) -> ParseResult<Self> {
        let mut body = cursor.sub_cursor(chunk.len())?;
        let mut running_status = None;
        let mut mtrk_events = vec![];

        while !body.is_empty() {
            mtrk_events.push(MTrkEvent::decode(&mut body, &mut running_status)?);
        }

        log::debug!(
            "Decoded track chunk of {} bytes with {} events",
            chunk.len(),
            mtrk_events.len()
        );

        Ok(Self { mtrk_events })
    }

    /// Concatenated event bytes, without the chunk framing
    pub fn payload_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![];

        for mtrk_event in &self.mtrk_events {
            bytes.extend(mtrk_event.to_midi_bytes());
        }

        bytes
    }
}

impl From<Vec<MTrkEvent>> for TrackChunk {
    fn from(mtrk_events: Vec<MTrkEvent>) -> Self {
        Self { mtrk_events }
    }
}

impl TrackChunk {
    /// The framed `MTrk` chunk. Fails if the payload does not fit a 32 bit length
    pub fn to_midi_bytes(&self) -> Result<Vec<u8>, ValidationError> {
        let bytes = self.payload_bytes();
        let chunk = Chunk::for_payload(TRACK_DATA_CHUNK, bytes.len())?;

        Ok((chunk, bytes).to_midi_bytes())
    }
}

/// A MIDI Event with a DeltaTime and an attached Event
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MTrkEvent {
    /// Delta time is a variable-length representation of how much time to wait in ticks before the
    /// event follows.
    delta_time: u32,
    /// Absolute time of the event in microseconds, filled in by the timing resolver
    microsecond_offset: f64,
    /// The event that occurs after the delta time is waited for
    event: Event,
}

impl MTrkEvent {
    /// Pairs an event with the ticks to wait before it
    pub fn new(delta_time: u32, event: impl Into<Event>) -> Self {
        Self {
            delta_time,
            microsecond_offset: 0.0,
            event: event.into(),
        }
    }

    /// Ticks since the previous event in the track
    pub fn delta_time(&self) -> u32 {
        self.delta_time
    }

    /// Absolute time since the start of the track. Zero until the owning file is resolved
    pub fn microsecond_offset(&self) -> f64 {
        self.microsecond_offset
    }

    /// Set by the timing resolver only
    pub(crate) fn set_microsecond_offset(&mut self, offset: f64) {
        self.microsecond_offset = offset;
    }

    /// The event payload
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Decodes one delta time and event, carrying running status across calls
    pub fn decode(
        cursor: &mut MidiCursor<'_>,
        running_status: &mut Option<u8>,
    ) -> ParseResult<Self> {
        let delta_time = vlq::decode(cursor)?;
        let event = Event::decode(cursor, running_status)?;

        Ok(Self::new(delta_time, event))
    }
}

impl MidiWriteable for MTrkEvent {
    fn to_midi_bytes(&self) -> Vec<u8> {
        let mut bytes = vlq::encode(self.delta_time);
        bytes.extend(self.event.to_midi_bytes());

        bytes
    }
}

/// Any event that may occur
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    /// A channel voice event
    MidiEvent(ChannelEvent),
    /// A system exclusive event
    SysexEvent(SysexEvent),
    /// Specifies non-MIDI information useful to this format or to sequencers
    MetaEvent(MetaEvent),
}

impl Event {
    /// The tempo this event sets, if it is a Set Tempo meta event
    pub fn tempo(&self) -> Option<u32> {
        match self {
            Self::MetaEvent(MetaEvent::Tempo(tempo)) => Some(*tempo),
            _ => None,
        }
    }

    /// Decodes an event starting at its status byte.
    ///
    /// A leading byte with the high bit clear is a data byte: the event reuses the last channel
    /// status seen in this track.
    pub fn decode(
        cursor: &mut MidiCursor<'_>,
        running_status: &mut Option<u8>,
    ) -> ParseResult<Self> {
        let status_position = cursor.position();
        let prefix = cursor.read_u8()?;
        let unknown =
            || ParseError::new(status_position, ErrorKind::UnknownEventStatusByte(prefix));

        match prefix {
            data if data < 0x80 => {
                let status = running_status.ok_or_else(unknown)?;
                log::trace!("Running status {status:#04X} at byte {status_position}");

                ChannelEvent::decode(status, Some(data), cursor)?
                    .map(Event::MidiEvent)
                    .ok_or_else(unknown)
            }

            status if (0x80..=0xEF).contains(&status) => {
                *running_status = Some(status);

                ChannelEvent::decode(status, None, cursor)?
                    .map(Event::MidiEvent)
                    .ok_or_else(unknown)
            }

            SYSEX_START => Ok(Event::SysexEvent(SysexEvent::decode(
                SysexLead::Start,
                cursor,
            )?)),
            SYSEX_ESCAPE => Ok(Event::SysexEvent(SysexEvent::decode(
                SysexLead::Escape,
                cursor,
            )?)),

            META_PREFIX => Ok(Event::MetaEvent(MetaEvent::decode(cursor)?)),

            _ => Err(unknown()),
        }
    }
}

impl From<ChannelEvent> for Event {
    fn from(value: ChannelEvent) -> Self {
        Self::MidiEvent(value)
    }
}

impl From<SysexEvent> for Event {
    fn from(value: SysexEvent) -> Self {
        Self::SysexEvent(value)
    }
}

impl From<MetaEvent> for Event {
    fn from(value: MetaEvent) -> Self {
        Self::MetaEvent(value)
    }
}

impl MidiWriteable for Event {
    fn to_midi_bytes(&self) -> Vec<u8> {
        match self {
            Self::MidiEvent(event) => event.to_midi_bytes(),
            Self::SysexEvent(event) => event.to_midi_bytes(),
            Self::MetaEvent(event) => event.to_midi_bytes(),
        }
    }
}
