//! Human readable names for channel events, looked up in caller supplied tables

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::chunk::track::channel::{ChannelEvent, ChannelMessage};

/// Pitch class names starting from C, indexed by `key % 12`
pub const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C♯", "D", "D♯", "E", "F", "F♯", "G", "G♯", "A", "A♯", "B",
];

/// A General MIDI style program entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Instrument<'t> {
    /// Display name of the program
    pub name: &'t str,
    /// Family the program belongs to
    pub category: &'t str,
}

/// Read only lookup tables used to annotate channel events.
///
/// The key table repeats every `keys.len()` entries, so a 12 entry pitch class table and a full
/// 128 entry table both work. The program table is indexed by program number.
///
/// ```rust
/// use smfcodec::{
///     chunk::track::channel::{ChannelEvent, ChannelMessage},
///     names::{Annotation, NameTables, PITCH_CLASS_NAMES},
/// };
///
/// let tables = NameTables::new(&PITCH_CLASS_NAMES, &[]);
/// let note = ChannelEvent::new(0, ChannelMessage::NoteOn { key: 61, velocity: 90 })
///     .expect("Valid note");
///
/// assert_eq!(note.annotate(&tables), Some(Annotation::Key("C♯")));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameTables<'t> {
    /// Names of keys, cycled by key number
    keys: &'t [&'t str],
    /// Instruments by program number
    programs: &'t [Instrument<'t>],
}

impl<'t> NameTables<'t> {
    /// Bundles a key table and a program table
    pub const fn new(keys: &'t [&'t str], programs: &'t [Instrument<'t>]) -> Self {
        Self { keys, programs }
    }

    /// Name of a key number, if the key table is not empty
    pub fn key_name(&self, key: u8) -> Option<&'t str> {
        if self.keys.is_empty() {
            return None;
        }

        self.keys.get(key as usize % self.keys.len()).copied()
    }

    /// Instrument for a program number, if the table covers it
    pub fn instrument(&self, program: u8) -> Option<Instrument<'t>> {
        self.programs.get(program as usize).copied()
    }
}

/// A name attached to a channel event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub enum Annotation<'t> {
    /// The name of the key a note event plays
    Key(&'t str),
    /// The instrument a program change selects
    Program {
        /// The raw program number
        number: u8,
        /// Its table entry
        instrument: Instrument<'t>,
    },
}

impl ChannelEvent {
    /// Looks up the key name of a note on/off or the instrument of a program change.
    ///
    /// Other commands, and numbers the tables do not cover, yield `None`.
    pub fn annotate<'t>(&self, tables: &NameTables<'t>) -> Option<Annotation<'t>> {
        match *self.message() {
            ChannelMessage::NoteOn { key, .. } | ChannelMessage::NoteOff { key, .. } => {
                tables.key_name(key).map(Annotation::Key)
            }
            ChannelMessage::ProgramChange { program } => {
                tables
                    .instrument(program)
                    .map(|instrument| Annotation::Program {
                        number: program,
                        instrument,
                    })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Annotation, Instrument, NameTables, PITCH_CLASS_NAMES};
    use crate::chunk::track::channel::{ChannelEvent, ChannelMessage};

    const PROGRAMS: [Instrument<'static>; 2] = [
        Instrument {
            name: "Acoustic Grand Piano",
            category: "Piano",
        },
        Instrument {
            name: "Bright Acoustic Piano",
            category: "Piano",
        },
    ];

    fn event(message: ChannelMessage) -> ChannelEvent {
        ChannelEvent::new(9, message).expect("Valid event")
    }

    #[test]
    fn notes_are_named_by_pitch_class() {
        let tables = NameTables::new(&PITCH_CLASS_NAMES, &PROGRAMS);

        let middle_c = event(ChannelMessage::NoteOff {
            key: 60,
            velocity: 0,
        });
        assert_eq!(middle_c.annotate(&tables), Some(Annotation::Key("C")));

        let top = event(ChannelMessage::NoteOn {
            key: 127,
            velocity: 1,
        });
        assert_eq!(top.annotate(&tables), Some(Annotation::Key("G")));
    }

    #[test]
    fn program_changes_are_named_by_table() {
        let tables = NameTables::new(&PITCH_CLASS_NAMES, &PROGRAMS);

        let bright = event(ChannelMessage::ProgramChange { program: 1 });
        assert_eq!(
            bright.annotate(&tables),
            Some(Annotation::Program {
                number: 1,
                instrument: PROGRAMS[1],
            })
        );

        let uncovered = event(ChannelMessage::ProgramChange { program: 80 });
        assert_eq!(uncovered.annotate(&tables), None);
    }

    #[test]
    fn other_commands_and_empty_tables_are_unnamed() {
        let tables = NameTables::new(&[], &[]);

        let note = event(ChannelMessage::NoteOn {
            key: 64,
            velocity: 80,
        });
        assert_eq!(note.annotate(&tables), None);

        let full = NameTables::new(&PITCH_CLASS_NAMES, &PROGRAMS);
        let aftertouch = event(ChannelMessage::PolyAftertouch {
            key: 64,
            pressure: 3,
        });
        assert_eq!(aftertouch.annotate(&full), None);
    }
}
