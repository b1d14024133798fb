//! System Exclusive Messages

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{ParseResult, ValidationError},
    reader::MidiCursor,
    vlq,
    writer::MidiWriteable,
};

/// Status byte opening a complete (or first packet of a) system exclusive message
pub const SYSEX_START: u8 = 0xF0;
/// Status byte of a continuation packet or escaped bytes
pub const SYSEX_ESCAPE: u8 = 0xF7;

/// The lead byte a sysex event was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SysexLead {
    /// 0xF0, the lead byte is part of the payload
    Start,
    /// 0xF7, the payload excludes the lead byte
    Escape,
}

impl SysexLead {
    /// The raw lead byte
    pub fn byte(&self) -> u8 {
        match self {
            Self::Start => SYSEX_START,
            Self::Escape => SYSEX_ESCAPE,
        }
    }
}

/// A midi system exclusive event message
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SysexEvent {
    /// How the event was introduced
    lead: SysexLead,
    /// Logical payload. Starts with 0xF0 when `lead` is [`SysexLead::Start`]
    data: Vec<u8>,
}

impl SysexEvent {
    /// Creates a sysex event.
    ///
    /// For [`SysexLead::Start`] the data must begin with the 0xF0 lead byte itself.
    pub fn new(lead: SysexLead, data: Vec<u8>) -> Result<Self, ValidationError> {
        if lead == SysexLead::Start && data.first() != Some(&SYSEX_START) {
            return Err(ValidationError::InvalidSysexLead);
        }

        Ok(Self { lead, data })
    }

    /// How the event was introduced
    pub fn lead(&self) -> SysexLead {
        self.lead
    }

    /// The logical payload
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Decodes the length and payload following a lead byte that was already consumed
    pub fn decode(lead: SysexLead, cursor: &mut MidiCursor<'_>) -> ParseResult<Self> {
        let length = vlq::decode(cursor)? as usize;
        let payload = cursor.read_bytes(length)?;

        let mut data = Vec::with_capacity(length + 1);
        if lead == SysexLead::Start {
            data.push(SYSEX_START);
        }
        data.extend_from_slice(payload);

        Ok(Self { lead, data })
    }

    /// Bytes written after the lead byte and length
    fn wire_payload(&self) -> &[u8] {
        match self.lead {
            SysexLead::Start => self.data.get(1..).unwrap_or_default(),
            SysexLead::Escape => &self.data,
        }
    }
}

impl MidiWriteable for SysexEvent {
    fn to_midi_bytes(&self) -> Vec<u8> {
        let payload = self.wire_payload();

        let mut bytes = vec![self.lead.byte()];
        bytes.extend(vlq::encode(payload.len() as u32));
        bytes.extend_from_slice(payload);

        bytes
    }
}
