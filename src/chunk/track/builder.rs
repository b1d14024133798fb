//! Validated construction of track events for the write path

use super::{
    channel::{ChannelEvent, ChannelMessage, Command},
    meta::MetaEvent,
    sysex::{SysexEvent, SysexLead},
    Event, MTrkEvent,
};
use crate::error::ValidationError;

/// Describes an event field by field and checks the description when it is built.
///
/// ```rust
/// use smfcodec::chunk::track::{builder::EventBuilder, channel::Command};
///
/// let note = EventBuilder::channel_event(Command::NoteOn)
///     .on_channel(0)
///     .key(60)
///     .velocity(100)
///     .delta_time(0)
///     .build()
///     .expect("All NoteOn fields supplied");
///
/// assert_eq!(note.delta_time(), 0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EventBuilder {
    /// Ticks since the previous event
    delta_time: Option<u32>,
    /// What kind of event is being described
    kind: EventKind,
}

/// The event family being built
#[derive(Debug, Clone, PartialEq)]
enum EventKind {
    /// A channel event described by loose fields
    Channel(ChannelFields),
    /// A complete meta event
    Meta(MetaEvent),
    /// A sysex payload and its lead byte
    Sysex(SysexLead, Vec<u8>),
}

/// Loose channel event fields, checked against the command on build
#[derive(Debug, Clone, PartialEq)]
struct ChannelFields {
    /// The command being described
    command: Command,
    /// Channel 0-15
    channel: Option<u8>,
    /// Note number
    key: Option<u8>,
    /// Note velocity
    velocity: Option<u8>,
    /// Aftertouch pressure
    pressure: Option<u8>,
    /// Controller number
    controller_number: Option<u8>,
    /// Controller value
    controller_value: Option<u8>,
    /// Program number
    program: Option<u8>,
    /// 14 bit pitch bend
    bend: Option<u16>,
}

/// Unwraps a required field or reports it missing
fn require<T>(
    value: Option<T>,
    command: Command,
    field: &'static str,
) -> Result<T, ValidationError> {
    value.ok_or(ValidationError::MissingField { command, field })
}

impl ChannelFields {
    /// Empty fields for a command
    fn new(command: Command) -> Self {
        Self {
            command,
            channel: None,
            key: None,
            velocity: None,
            pressure: None,
            controller_number: None,
            controller_value: None,
            program: None,
            bend: None,
        }
    }

    /// Checks the fields the command needs are present and builds the event
    fn build(self) -> Result<ChannelEvent, ValidationError> {
        let command = self.command;
        let channel = self.channel.ok_or(ValidationError::MissingChannel)?;

        let message = match command {
            Command::NoteOff => ChannelMessage::NoteOff {
                key: require(self.key, command, "key")?,
                velocity: require(self.velocity, command, "velocity")?,
            },
            Command::NoteOn => ChannelMessage::NoteOn {
                key: require(self.key, command, "key")?,
                velocity: require(self.velocity, command, "velocity")?,
            },
            Command::PolyAftertouch => ChannelMessage::PolyAftertouch {
                key: require(self.key, command, "key")?,
                pressure: require(self.pressure, command, "pressure")?,
            },
            Command::ControlChange => ChannelMessage::ControlChange {
                controller_number: require(self.controller_number, command, "controller_number")?,
                controller_value: require(self.controller_value, command, "controller_value")?,
            },
            Command::ProgramChange => ChannelMessage::ProgramChange {
                program: require(self.program, command, "program")?,
            },
            Command::ChannelAftertouch => ChannelMessage::ChannelAftertouch {
                pressure: require(self.pressure, command, "pressure")?,
            },
            Command::PitchBend => ChannelMessage::PitchBend {
                bend: require(self.bend, command, "bend")?,
            },
        };

        ChannelEvent::new(channel, message)
    }
}

/// Generates a setter for a loose channel field; ignored for meta and sysex events
macro_rules! channel_field {
    ($name:ident, $ty:ty) => {
        #[doc = concat!("Sets the `", stringify!($name), "` field of a channel event")]
        pub fn $name(mut self, $name: $ty) -> Self {
            if let EventKind::Channel(fields) = &mut self.kind {
                fields.$name = Some($name);
            }
            self
        }
    };
}

impl EventBuilder {
    /// Starts describing a channel event
    pub fn channel_event(command: Command) -> Self {
        Self {
            delta_time: None,
            kind: EventKind::Channel(ChannelFields::new(command)),
        }
    }

    /// Starts describing a meta event
    pub fn meta(event: MetaEvent) -> Self {
        Self {
            delta_time: None,
            kind: EventKind::Meta(event),
        }
    }

    /// Starts describing a sysex event. `data` is the logical payload
    pub fn sysex(lead: SysexLead, data: Vec<u8>) -> Self {
        Self {
            delta_time: None,
            kind: EventKind::Sysex(lead, data),
        }
    }

    /// Ticks to wait after the previous event
    pub fn delta_time(mut self, delta_time: u32) -> Self {
        self.delta_time = Some(delta_time);
        self
    }

    /// The channel a channel event is sent on
    pub fn on_channel(mut self, channel: u8) -> Self {
        if let EventKind::Channel(fields) = &mut self.kind {
            fields.channel = Some(channel);
        }
        self
    }

    channel_field!(key, u8);
    channel_field!(velocity, u8);
    channel_field!(pressure, u8);
    channel_field!(controller_number, u8);
    channel_field!(controller_value, u8);
    channel_field!(program, u8);
    channel_field!(bend, u16);

    /// Validates the description and produces the event
    pub fn build(self) -> Result<MTrkEvent, ValidationError> {
        let delta_time = self.delta_time.ok_or(ValidationError::MissingDeltaTime)?;

        let event: Event = match self.kind {
            EventKind::Channel(fields) => fields.build()?.into(),
            EventKind::Meta(meta) => {
                meta.validate()?;
                meta.into()
            }
            EventKind::Sysex(lead, data) => SysexEvent::new(lead, data)?.into(),
        };

        Ok(MTrkEvent::new(delta_time, event))
    }
}
