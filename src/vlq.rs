//! Variable length quantities: big-endian 7 bit groups where every byte but the last has its
//! msb set

use crate::{
    error::{ErrorKind, ParseError, ParseResult},
    reader::MidiCursor,
};

/// Largest value the MIDI format allows in a variable length quantity (four bytes)
pub const VLQ_MAX: u32 = 0x0FFF_FFFF;

/// Bytes needed to hold any `u32`
const MAX_VLQ_BYTES: usize = 5;

/// Reads a variable length quantity from the cursor.
///
/// Only the shortest encoding of a value is accepted: a leading `0x80` group is padding and
/// fails as [`ErrorKind::MalformedVlq`], so every decoded quantity writes back to the same bytes.
pub fn decode(cursor: &mut MidiCursor<'_>) -> ParseResult<u32> {
    const MASK: u8 = 0x7F;
    const PADDING: u8 = 0x80;
    let start = cursor.position();
    let malformed = || ParseError::new(start, ErrorKind::MalformedVlq);

    let mut result: u64 = 0;
    for index in 0..MAX_VLQ_BYTES {
        let byte = cursor.read_u8().map_err(|_| malformed())?;
        if index == 0 && byte == PADDING {
            return Err(malformed());
        }

        result <<= 7;
        result |= (byte & MASK) as u64;

        if !msb_is_one(byte) {
            return u32::try_from(result).map_err(|_| malformed());
        }
    }

    Err(malformed())
}

/// Goes backwards from a value to its variable length bytes
pub fn encode(mut value: u32) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(MAX_VLQ_BYTES);

    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;

        if !bytes.is_empty() {
            byte |= 0x80;
        }

        bytes.push(byte);

        if value == 0 {
            break;
        }
    }

    bytes.reverse();
    bytes
}

/// Returns true if the msb of a byte is 1
fn msb_is_one(byte: u8) -> bool {
    byte >> 7 == 1
}

#[cfg(test)]
mod tests {
    use super::{decode, encode, VLQ_MAX};
    use crate::{error::ErrorKind, reader::MidiCursor};

    fn decode_all(bytes: &[u8]) -> u32 {
        let mut cursor = MidiCursor::new(bytes);
        let value = decode(&mut cursor).expect("Decode variable length quantity");
        assert!(cursor.is_empty());
        value
    }

    #[test]
    fn delta_time_parsed() {
        assert_eq!(decode_all(&[0x81, 0x40]), 192);
    }

    #[test]
    fn delta_time_backwards_parsed() {
        assert_eq!(encode(192), vec![0x81, 0x40]);
    }

    #[test]
    fn zero_is_a_single_byte() {
        assert_eq!(encode(0), vec![0x00]);
        assert_eq!(decode_all(&[0x00]), 0);
    }

    #[test]
    fn reference_values_from_the_smf_format() {
        let cases: [(u32, &[u8]); 8] = [
            (0x40, &[0x40]),
            (0x7F, &[0x7F]),
            (0x80, &[0x81, 0x00]),
            (0x2000, &[0xC0, 0x00]),
            (0x3FFF, &[0xFF, 0x7F]),
            (0x4000, &[0x81, 0x80, 0x00]),
            (0x10_0000, &[0xC0, 0x80, 0x00]),
            (VLQ_MAX, &[0xFF, 0xFF, 0xFF, 0x7F]),
        ];

        for (value, bytes) in cases {
            assert_eq!(encode(value), bytes, "encoding {value:#X}");
            assert_eq!(decode_all(bytes), value, "decoding {bytes:02X?}");
        }
    }

    #[test]
    fn full_u32_range_survives() {
        for value in [VLQ_MAX + 1, u32::MAX - 1, u32::MAX] {
            assert_eq!(decode_all(&encode(value)), value);
        }
    }

    #[test]
    fn unterminated_quantity_is_malformed() {
        let mut cursor = MidiCursor::new(&[0x81, 0x80]);
        let err = decode(&mut cursor).unwrap_err();

        assert_eq!(*err.kind(), ErrorKind::MalformedVlq);
        assert_eq!(err.position(), 0);
    }

    #[test]
    fn overlong_quantity_is_malformed() {
        let mut cursor = MidiCursor::new(&[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]);
        let err = decode(&mut cursor).unwrap_err();

        assert_eq!(*err.kind(), ErrorKind::MalformedVlq);
    }

    #[test]
    fn padded_quantity_is_malformed() {
        let padded: [&[u8]; 3] = [&[0x80, 0x00], &[0x80, 0x81, 0x00], &[0x80, 0x80, 0x80, 0x7F]];
        for bytes in padded {
            let mut cursor = MidiCursor::new(bytes);
            let err = decode(&mut cursor).unwrap_err();

            assert_eq!(*err.kind(), ErrorKind::MalformedVlq, "decoding {bytes:02X?}");
            assert_eq!(err.position(), 0);
        }

        // Zero groups after the first are ordinary digits
        assert_eq!(decode_all(&[0x81, 0x80, 0x00]), 0x4000);
    }
}
