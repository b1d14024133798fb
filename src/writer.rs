//! The `MidiWriteable` trait is the write-side counterpart of [`crate::reader::MidiCursor`]: it
//! turns the crate's event and chunk types back into canonical MIDI bytes. Everything written is
//! big-endian, and channel events always carry an explicit status byte.

use crate::Chunk;

/// A trait for types that can be encoded as MIDI-format bytes.
///
/// Implemented by the primitive integers used in chunk framing as well as by [`Chunk`], the
/// event types and the file model.
pub trait MidiWriteable {
    /// Converts the data to a MIDI format byte sequence
    fn to_midi_bytes(&self) -> Vec<u8>;
}

impl MidiWriteable for u8 {
    fn to_midi_bytes(&self) -> Vec<u8> {
        vec![*self]
    }
}

impl MidiWriteable for i8 {
    fn to_midi_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl MidiWriteable for u16 {
    fn to_midi_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl MidiWriteable for u32 {
    fn to_midi_bytes(&self) -> Vec<u8> {
        self.to_be_bytes().to_vec()
    }
}

impl MidiWriteable for [u8; 4] {
    fn to_midi_bytes(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl MidiWriteable for Chunk {
    fn to_midi_bytes(&self) -> Vec<u8> {
        let mut bytes = self.chunk_type.to_midi_bytes();
        bytes.extend(self.length.to_midi_bytes());

        bytes
    }
}

impl MidiWriteable for (Chunk, Vec<u8>) {
    fn to_midi_bytes(&self) -> Vec<u8> {
        let mut bytes = self.0.to_midi_bytes();
        bytes.extend(self.1.iter());

        bytes
    }
}
