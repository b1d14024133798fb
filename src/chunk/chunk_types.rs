//! Chunk type constants

/// Bytes in a chunk tag
pub const TAG_LENGTH: usize = 4;

/// Creates a chunk type identifier
macro_rules! chunk_type {
    ($const_name:ident, $a:expr, $b:expr, $c:expr, $d:expr) => {
        /// MIDI chunk type
        pub const $const_name: [u8; TAG_LENGTH] = [$a, $b, $c, $d];
    };
}

chunk_type!(HEADER_CHUNK, b'M', b'T', b'h', b'd');
chunk_type!(TRACK_DATA_CHUNK, b'M', b'T', b'r', b'k');
