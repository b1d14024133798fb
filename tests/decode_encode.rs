use smfcodec::{
    chunk::{
        header::{Division, Format},
        track::{
            builder::EventBuilder,
            channel::{ChannelMessage, Command},
            meta::{KeySignature, ManufacturerId, MetaEvent, SequencerSpecific, TimeSignature},
            sysex::{SysexEvent, SysexLead},
            Event, MTrkEvent,
        },
    },
    file::Diagnostic,
    ErrorKind, MidiFile, Sequence, Track,
};

/// Wraps a track payload in `MTrk` framing
fn mtrk(payload: &[u8]) -> Vec<u8> {
    let mut bytes = b"MTrk".to_vec();
    bytes.extend((payload.len() as u32).to_be_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

/// A header chunk with the given format, track count and ticks per quarter note
fn mthd(format: u16, ntrks: u16, division: u16) -> Vec<u8> {
    let mut bytes = vec![0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06];
    bytes.extend(format.to_be_bytes());
    bytes.extend(ntrks.to_be_bytes());
    bytes.extend(division.to_be_bytes());
    bytes
}

fn file(format: u16, division: u16, tracks: &[&[u8]]) -> Vec<u8> {
    let mut bytes = mthd(format, tracks.len() as u16, division);
    for payload in tracks {
        bytes.extend(mtrk(payload));
    }
    bytes
}

fn offsets(file: &MidiFile, track: usize) -> Vec<f64> {
    file.tracks()[track]
        .events()
        .iter()
        .map(MTrkEvent::microsecond_offset)
        .collect()
}

#[test]
fn header_bytes_decode_to_format_one_with_two_tracks() {
    let mut bytes = vec![
        0x4D, 0x54, 0x68, 0x64, 0x00, 0x00, 0x00, 0x06, 0x00, 0x01, 0x00, 0x02, 0x00, 0x78,
    ];
    bytes.extend(mtrk(&[0x00, 0xFF, 0x2F, 0x00]));
    bytes.extend(mtrk(&[0x00, 0xFF, 0x2F, 0x00]));

    let file = smfcodec::decode(&bytes).expect("Decode two empty tracks");

    assert_eq!(file.format(), Format::One);
    assert_eq!(file.track_count(), 2);
    assert_eq!(file.division(), Division::Metrical(120));
    assert!(file.diagnostics().is_empty());
}

#[test]
fn note_pair_resolves_to_two_seconds() {
    let bytes = file(
        0,
        120,
        &[&[0x00, 0x90, 0x3C, 0x64, 0x83, 0x60, 0x80, 0x3C, 0x00]],
    );

    let file = smfcodec::decode(&bytes).expect("Decode note pair");

    assert_eq!(offsets(&file, 0), vec![0.0, 2_000_000.0]);
    assert_eq!(file.duration(), 2_000_000.0);
}

#[test]
fn tempo_change_between_notes() {
    let bytes = file(
        0,
        120,
        &[&[
            0x00, 0x90, 0x3C, 0x64, // NoteOn
            0x78, 0xFF, 0x51, 0x03, 0x04, 0x93, 0xE0, // Tempo 300000 after 120 ticks
            0x78, 0x90, 0x3E, 0x64, // NoteOn after 120 more ticks
        ]],
    );

    let file = smfcodec::decode(&bytes).expect("Decode tempo change");

    assert_eq!(offsets(&file, 0), vec![0.0, 500_000.0, 800_000.0]);
    assert_eq!(file.duration(), 800_000.0);
}

#[test]
fn running_status_decodes_like_explicit_status() {
    let explicit = file(0, 96, &[&[0x00, 0x90, 0x3C, 0x64, 0x10, 0x90, 0x40, 0x64]]);
    let running = file(0, 96, &[&[0x00, 0x90, 0x3C, 0x64, 0x10, 0x40, 0x64]]);

    let explicit = smfcodec::decode(&explicit).expect("Decode explicit status");
    let running = smfcodec::decode(&running).expect("Decode running status");

    assert_eq!(explicit.tracks(), running.tracks());
    assert_eq!(explicit.duration(), running.duration());
}

#[test]
fn running_status_does_not_cross_tracks() {
    let bytes = file(1, 96, &[&[0x00, 0x90, 0x3C, 0x64], &[0x00, 0x3C, 0x64]]);

    let err = smfcodec::decode(&bytes).unwrap_err();

    assert_eq!(*err.kind(), ErrorKind::UnknownEventStatusByte(0x3C));
    assert_eq!(err.position(), 14 + 8 + 4 + 8 + 1);
}

#[test]
fn track_longer_than_buffer_is_truncated() {
    let mut bytes = mthd(0, 1, 96);
    bytes.extend(b"MTrk");
    bytes.extend(10u32.to_be_bytes());
    bytes.extend([0x00, 0x90, 0x3C, 0x64, 0x00]);

    let err = smfcodec::decode(&bytes).unwrap_err();

    assert!(err.is_truncated());
}

#[test]
fn event_crossing_track_boundary_is_truncated() {
    // NoteOn declared inside a 3 byte track, its velocity lies outside
    let mut bytes = mthd(0, 1, 96);
    bytes.extend(mtrk(&[0x00, 0x90, 0x3C]));
    bytes.push(0x64);

    let err = smfcodec::decode(&bytes).unwrap_err();

    assert_eq!(*err.kind(), ErrorKind::TruncatedChunk);
    assert_eq!(err.position(), 14 + 8 + 3);
}

#[test]
fn missing_tracks_are_truncated() {
    let bytes = mthd(1, 2, 96);

    let err = smfcodec::decode(&bytes).unwrap_err();

    assert!(err.is_truncated());
    assert_eq!(err.position(), 14);
}

#[test]
fn track_must_start_with_mtrk() {
    let mut bytes = mthd(0, 1, 96);
    bytes.extend(b"XFIH\x00\x00\x00\x00");

    let err = smfcodec::decode(&bytes).unwrap_err();

    assert_eq!(*err.kind(), ErrorKind::UnknownChunkTag(*b"XFIH"));
    assert_eq!(err.position(), 14);
}

#[test]
fn unsupported_format_is_rejected() {
    let bytes = mthd(3, 0, 96);

    let err = smfcodec::decode(&bytes).unwrap_err();

    assert_eq!(*err.kind(), ErrorKind::UnsupportedFormat(3));
    assert_eq!(err.position(), 8);
}

#[test]
fn malformed_delta_time_is_reported() {
    let bytes = file(0, 96, &[&[0x81, 0x80]]);

    let err = smfcodec::decode(&bytes).unwrap_err();

    assert_eq!(*err.kind(), ErrorKind::MalformedVlq);
    assert_eq!(err.position(), 14 + 8);
}

#[test]
fn fixed_length_meta_with_wrong_length_is_rejected() {
    let bytes = file(0, 96, &[&[0x00, 0xFF, 0x51, 0x02, 0x07, 0xA1]]);

    let err = smfcodec::decode(&bytes).unwrap_err();

    assert_eq!(
        *err.kind(),
        ErrorKind::MetaEventLengthMismatch {
            meta_type: 0x51,
            expected: 3,
            actual: 2,
        }
    );
}

#[test]
fn trailing_bytes_are_reported_not_fatal() {
    let mut bytes = file(0, 96, &[&[0x00, 0xFF, 0x2F, 0x00]]);
    let end = bytes.len();
    bytes.extend([0x00, 0x00, 0x00]);

    let file = smfcodec::decode(&bytes).expect("Trailing bytes are tolerated");

    assert_eq!(
        file.diagnostics(),
        &[Diagnostic::TrailingBytes {
            offset: end,
            len: 3
        }]
    );
}

#[test]
fn every_event_family_survives_reencoding() {
    let mut conductor = Track::new();
    conductor.push(MTrkEvent::new(0, MetaEvent::SequenceNumber(7)));
    conductor.push(MTrkEvent::new(0, MetaEvent::TrackName("Conductor".into())));
    conductor.push(MTrkEvent::new(0, MetaEvent::Copyright("© 2024".into())));
    conductor.push(MTrkEvent::new(0, MetaEvent::Tempo(400_000)));
    conductor.push(MTrkEvent::new(
        0,
        MetaEvent::TimeSignature(TimeSignature {
            numerator: 6,
            denominator_exponent: 3,
            clocks_per_tick: 24,
            thirty_second_notes_per_quarter: 8,
        }),
    ));
    conductor.push(MTrkEvent::new(
        0,
        MetaEvent::KeySignature(KeySignature {
            sharps_flats: -3,
            minor: true,
        }),
    ));
    conductor.push(MTrkEvent::new(
        0,
        MetaEvent::SequencerSpecific(SequencerSpecific {
            manufacturer_id: Some(ManufacturerId::ThreeByte([0x00, 0x20, 0x29])),
            data: vec![1, 2, 3],
        }),
    ));
    conductor.push(MTrkEvent::new(0, MetaEvent::UnknownRaw(0x60, vec![9, 9])));
    conductor.push(MTrkEvent::new(960, MetaEvent::EndOfTrack));

    let mut lead = Track::new();
    lead.push(MTrkEvent::new(
        0,
        SysexEvent::new(SysexLead::Start, vec![0xF0, 0x7E, 0x7F, 0x09, 0x01, 0xF7])
            .expect("Valid sysex"),
    ));
    lead.push(MTrkEvent::new(
        0,
        SysexEvent::new(SysexLead::Escape, vec![0xF3, 0x01]).expect("Valid escape"),
    ));
    for (command, delta_time) in [(Command::NoteOn, 0), (Command::NoteOff, 240)] {
        lead.push(
            EventBuilder::channel_event(command)
                .on_channel(3)
                .key(64)
                .velocity(90)
                .delta_time(delta_time)
                .build()
                .expect("Complete note"),
        );
    }
    lead.push(
        EventBuilder::channel_event(Command::PitchBend)
            .on_channel(3)
            .bend(0x3FFF)
            .delta_time(10)
            .build()
            .expect("Complete bend"),
    );
    lead.push(MTrkEvent::new(0, MetaEvent::EndOfTrack));

    let mut sequence = Sequence::new();
    sequence.add_track(conductor);
    sequence.add_track(lead);

    let built = sequence.to_midi_bytes().expect("Write built sequence");
    let first = smfcodec::decode(&built).expect("Decode built sequence");
    let rewritten = first.to_midi_bytes().expect("Write decoded file");
    let second = smfcodec::decode(&rewritten).expect("Decode re-encoded file");

    assert_eq!(first, second);
    assert_eq!(first.tracks()[0].name(), Some("Conductor"));
    assert_eq!(first.track_count(), sequence.tracks().len());

    let sysex = first.tracks()[1].events()[0].event();
    match sysex {
        Event::SysexEvent(sysex) => {
            assert_eq!(sysex.lead(), SysexLead::Start);
            assert_eq!(sysex.data()[0], 0xF0);
        }
        other => panic!("Expected sysex, got {other:?}"),
    }

    let bend = first.tracks()[1].events()[4].event();
    match bend {
        Event::MidiEvent(channel) => {
            assert_eq!(*channel.message(), ChannelMessage::PitchBend { bend: 0x3FFF })
        }
        other => panic!("Expected pitch bend, got {other:?}"),
    }
}

#[test]
fn zero_velocity_note_on_keeps_its_status() {
    let bytes = file(0, 96, &[&[0x00, 0x91, 0x3C, 0x00]]);

    let file = smfcodec::decode(&bytes).expect("Decode zero velocity note");
    let Event::MidiEvent(note) = file.tracks()[0].events()[0].event() else {
        panic!("Expected a channel event");
    };

    assert_eq!(note.command(), Command::NoteOn);
    assert_eq!(note.logical_command(), Command::NoteOff);
    assert_eq!(note.channel(), 1);
    assert_eq!(file.to_midi_bytes(), Ok(bytes));
}

#[test]
fn smpte_division_uses_frame_timing() {
    // 25 fps with 40 ticks per frame: one millisecond per tick
    let bytes = file(
        0,
        0xE728,
        &[&[
            0x00, 0xFF, 0x51, 0x03, 0x03, 0xD0, 0x90, // Tempo is ignored
            0x64, 0x90, 0x3C, 0x64,
        ]],
    );

    let file = smfcodec::decode(&bytes).expect("Decode time code file");

    match file.division() {
        Division::TimeCodeBased(smpte) => {
            assert_eq!(smpte.fps(), 25);
            assert_eq!(smpte.tpf(), 40);
        }
        other => panic!("Expected time code division, got {other:?}"),
    }
    assert_eq!(offsets(&file, 0), vec![0.0, 100_000.0]);
    assert_eq!(file.to_midi_bytes(), Ok(bytes));
}
