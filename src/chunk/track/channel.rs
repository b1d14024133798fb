//! Channel voice messages and their status byte parsing

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::{ParseResult, ValidationError},
    reader::MidiCursor,
    writer::MidiWriteable,
};

/// The command carried in the high nibble of a channel status byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Command {
    /// 0x8n
    NoteOff,
    /// 0x9n
    NoteOn,
    /// 0xAn
    PolyAftertouch,
    /// 0xBn
    ControlChange,
    /// 0xCn
    ProgramChange,
    /// 0xDn
    ChannelAftertouch,
    /// 0xEn
    PitchBend,
}

impl Command {
    /// Reads the command out of a status byte, `None` if the byte is not a channel status
    pub fn from_status(status: u8) -> Option<Self> {
        match status >> 4 {
            0x8 => Some(Self::NoteOff),
            0x9 => Some(Self::NoteOn),
            0xA => Some(Self::PolyAftertouch),
            0xB => Some(Self::ControlChange),
            0xC => Some(Self::ProgramChange),
            0xD => Some(Self::ChannelAftertouch),
            0xE => Some(Self::PitchBend),
            _ => None,
        }
    }

    /// The high nibble of the status byte
    pub fn nibble(&self) -> u8 {
        match self {
            Self::NoteOff => 0x8,
            Self::NoteOn => 0x9,
            Self::PolyAftertouch => 0xA,
            Self::ControlChange => 0xB,
            Self::ProgramChange => 0xC,
            Self::ChannelAftertouch => 0xD,
            Self::PitchBend => 0xE,
        }
    }

    /// Number of data bytes following the status byte
    pub fn data_len(&self) -> usize {
        match self {
            Self::ProgramChange | Self::ChannelAftertouch => 1,
            _ => 2,
        }
    }
}

/// A MIDI channel message body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChannelMessage {
    /// Turn Off event
    /// This message is sent when a note is released
    NoteOff {
        /// Note number
        key: u8,
        /// Release velocity
        velocity: u8,
    },
    /// Turn On event
    /// This message is sent when a note is depressed
    NoteOn {
        /// Note number
        key: u8,
        /// Attack velocity
        velocity: u8,
    },
    /// Polyphonic Key Pressure
    /// This message is most often sent by pressing down a key after it "bottoms out"
    PolyAftertouch {
        /// Note number
        key: u8,
        /// Pressure amount
        pressure: u8,
    },
    /// Control change
    /// This message is sent when a controller value changes. Controllers include devices such as
    /// pedals and levers. Certain controller numbers are reserved.
    ControlChange {
        /// Controller number
        controller_number: u8,
        /// New value
        controller_value: u8,
    },
    /// Program change.
    /// This message is sent when the patch number changes
    ProgramChange {
        /// New program number
        program: u8,
    },
    /// Channel Pressure
    /// This message is most often sent by pressing down on a key after it "bottoms out"
    ChannelAftertouch {
        /// Pressure amount
        pressure: u8,
    },
    /// Pitch Wheel Change
    /// This message is sent to indicate a change in the pitch wheel as measured by a fourteen bit
    /// value.
    PitchBend {
        /// 14 bit bend, 0x2000 is centered
        bend: u16,
    },
}

impl ChannelMessage {
    /// The raw command of the message
    pub fn command(&self) -> Command {
        match self {
            Self::NoteOff { .. } => Command::NoteOff,
            Self::NoteOn { .. } => Command::NoteOn,
            Self::PolyAftertouch { .. } => Command::PolyAftertouch,
            Self::ControlChange { .. } => Command::ControlChange,
            Self::ProgramChange { .. } => Command::ProgramChange,
            Self::ChannelAftertouch { .. } => Command::ChannelAftertouch,
            Self::PitchBend { .. } => Command::PitchBend,
        }
    }

    /// Data bytes as they appear on the wire
    fn data_bytes(&self) -> Vec<u8> {
        match *self {
            Self::NoteOff { key, velocity } | Self::NoteOn { key, velocity } => vec![key, velocity],
            Self::PolyAftertouch { key, pressure } => vec![key, pressure],
            Self::ControlChange {
                controller_number,
                controller_value,
            } => vec![controller_number, controller_value],
            Self::ProgramChange { program } => vec![program],
            Self::ChannelAftertouch { pressure } => vec![pressure],
            Self::PitchBend { bend } => vec![(bend & 0x7F) as u8, ((bend >> 7) & 0x7F) as u8],
        }
    }

    /// Checks every data value fits in 7 bits (14 for pitch bend)
    fn validate(&self) -> Result<(), ValidationError> {
        let check = |field: &'static str, value: u8| {
            if value > 0x7F {
                Err(ValidationError::DataByteOutOfRange { field, value })
            } else {
                Ok(())
            }
        };

        match *self {
            Self::NoteOff { key, velocity } | Self::NoteOn { key, velocity } => {
                check("key", key)?;
                check("velocity", velocity)
            }
            Self::PolyAftertouch { key, pressure } => {
                check("key", key)?;
                check("pressure", pressure)
            }
            Self::ControlChange {
                controller_number,
                controller_value,
            } => {
                check("controller_number", controller_number)?;
                check("controller_value", controller_value)
            }
            Self::ProgramChange { program } => check("program", program),
            Self::ChannelAftertouch { pressure } => check("pressure", pressure),
            Self::PitchBend { bend } if bend > 0x3FFF => {
                Err(ValidationError::PitchBendOutOfRange(bend))
            }
            Self::PitchBend { .. } => Ok(()),
        }
    }
}

/// A channel voice event: a channel number and the message sent on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelEvent {
    /// Channel 0-15
    channel: u8,
    /// The message body
    message: ChannelMessage,
}

impl ChannelEvent {
    /// Creates a channel event, validating the channel and data ranges
    pub fn new(channel: u8, message: ChannelMessage) -> Result<Self, ValidationError> {
        if channel > 0x0F {
            return Err(ValidationError::ChannelOutOfRange(channel));
        }
        message.validate()?;

        Ok(Self { channel, message })
    }

    /// Channel number 0-15
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The message body
    pub fn message(&self) -> &ChannelMessage {
        &self.message
    }

    /// The command encoded in the status byte
    pub fn command(&self) -> Command {
        self.message.command()
    }

    /// The command as musicians read it: a NoteOn with velocity 0 is a NoteOff
    pub fn logical_command(&self) -> Command {
        match self.message {
            ChannelMessage::NoteOn { velocity: 0, .. } => Command::NoteOff,
            _ => self.command(),
        }
    }

    /// The status byte this event is written with
    pub fn status(&self) -> u8 {
        (self.command().nibble() << 4) | self.channel
    }

    /// Decodes the data bytes following `status`.
    ///
    /// `first` carries a data byte that was already consumed while looking for a status byte,
    /// which happens when the event relies on running status.
    pub fn decode(
        status: u8,
        first: Option<u8>,
        cursor: &mut MidiCursor<'_>,
    ) -> ParseResult<Option<Self>> {
        let Some(command) = Command::from_status(status) else {
            return Ok(None);
        };
        let channel = status & 0x0F;

        let mut first = first;

        let message = match command {
            Command::NoteOff => ChannelMessage::NoteOff {
                key: data_byte(&mut first, cursor)?,
                velocity: data_byte(&mut first, cursor)?,
            },
            Command::NoteOn => ChannelMessage::NoteOn {
                key: data_byte(&mut first, cursor)?,
                velocity: data_byte(&mut first, cursor)?,
            },
            Command::PolyAftertouch => ChannelMessage::PolyAftertouch {
                key: data_byte(&mut first, cursor)?,
                pressure: data_byte(&mut first, cursor)?,
            },
            Command::ControlChange => ChannelMessage::ControlChange {
                controller_number: data_byte(&mut first, cursor)?,
                controller_value: data_byte(&mut first, cursor)?,
            },
            Command::ProgramChange => ChannelMessage::ProgramChange {
                program: data_byte(&mut first, cursor)?,
            },
            Command::ChannelAftertouch => ChannelMessage::ChannelAftertouch {
                pressure: data_byte(&mut first, cursor)?,
            },
            Command::PitchBend => {
                let lsb = data_byte(&mut first, cursor)? as u16;
                let msb = data_byte(&mut first, cursor)? as u16;
                ChannelMessage::PitchBend {
                    bend: ((msb & 0x7F) << 7) | (lsb & 0x7F),
                }
            }
        };

        Ok(Some(Self { channel, message }))
    }
}

/// Takes the pending running status byte if there is one, otherwise reads the next byte
fn data_byte(first: &mut Option<u8>, cursor: &mut MidiCursor<'_>) -> ParseResult<u8> {
    match first.take() {
        Some(byte) => Ok(byte),
        None => cursor.read_u8(),
    }
}

impl MidiWriteable for ChannelEvent {
    fn to_midi_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.command().data_len());
        bytes.push(self.status());
        bytes.extend(self.message.data_bytes());

        bytes
    }
}
