//! Converts tick delta times into absolute microsecond offsets

use crate::chunk::{header::Division, track::TrackChunk};

/// Microseconds per quarter note until a tempo event says otherwise (120 bpm)
pub const DEFAULT_TEMPO: u32 = 500_000;

/// Microseconds spanned by `ticks` at a metrical resolution and tempo.
///
/// `tempo` falls back to [`DEFAULT_TEMPO`]. A resolution of zero yields zero.
///
/// ```rust
/// use smfcodec::timing::ticks_to_micros;
///
/// assert_eq!(ticks_to_micros(480, 120, None), 2_000_000.0);
/// ```
pub fn ticks_to_micros(ticks: u32, ticks_per_quarter_note: u16, tempo: Option<u32>) -> f64 {
    metrical_micros(ticks, ticks_per_quarter_note, tempo.unwrap_or(DEFAULT_TEMPO))
}

/// Ticks closest to `micros` at a metrical resolution and tempo
pub fn micros_to_ticks(micros: f64, ticks_per_quarter_note: u16, tempo: Option<u32>) -> u32 {
    let tempo = tempo.unwrap_or(DEFAULT_TEMPO);
    if tempo == 0 {
        return 0;
    }

    (micros * ticks_per_quarter_note as f64 / tempo as f64).round() as u32
}

/// `ticks * tempo / ticks_per_quarter_note`, multiplied before dividing
fn metrical_micros(ticks: u32, ticks_per_quarter_note: u16, tempo: u32) -> f64 {
    if ticks_per_quarter_note == 0 {
        return 0.0;
    }

    ticks as f64 * tempo as f64 / ticks_per_quarter_note as f64
}

/// The rate at which ticks advance in one track
#[derive(Debug, Clone, Copy)]
enum TickRate {
    /// Quarter note based ticks, scaled by the current tempo
    Metrical {
        /// Ticks per quarter note
        ticks_per_quarter_note: u16,
        /// Microseconds per quarter note
        tempo: u32,
    },
    /// Time code ticks with a fixed rate, in ticks per second
    TimeCode(f64),
}

impl TickRate {
    /// The starting rate of every track
    fn new(division: Division) -> Self {
        match division {
            Division::Metrical(ticks_per_quarter_note) => Self::Metrical {
                ticks_per_quarter_note,
                tempo: DEFAULT_TEMPO,
            },
            Division::TimeCodeBased(smpte) => {
                Self::TimeCode(smpte.fps_f64() * smpte.tpf() as f64)
            }
        }
    }

    /// Microseconds spanned by `ticks` at the current rate
    fn micros(&self, ticks: u32) -> f64 {
        match *self {
            Self::Metrical {
                ticks_per_quarter_note,
                tempo,
            } => metrical_micros(ticks, ticks_per_quarter_note, tempo),
            Self::TimeCode(ticks_per_second) if ticks_per_second > 0.0 => {
                ticks as f64 * 1_000_000.0 / ticks_per_second
            }
            Self::TimeCode(_) => 0.0,
        }
    }

    /// Applies a tempo change. Time code rates ignore tempo
    fn set_tempo(&mut self, new_tempo: u32) {
        if let Self::Metrical { tempo, .. } = self {
            *tempo = new_tempo;
        }
    }
}

/// Assigns every event of a track its absolute offset and returns the offset of the last event.
///
/// The tempo starts at [`DEFAULT_TEMPO`] and a tempo event only affects the events after it.
pub fn resolve_track(track: &mut TrackChunk, division: Division) -> f64 {
    let mut rate = TickRate::new(division);
    let mut offset = 0.0;

    for mtrk in track.events_mut() {
        offset += rate.micros(mtrk.delta_time());
        mtrk.set_microsecond_offset(offset);

        if let Some(tempo) = mtrk.event().tempo() {
            rate.set_tempo(tempo);
        }
    }

    offset
}

/// Resolves every track independently and returns the largest offset found
pub fn resolve(tracks: &mut [TrackChunk], division: Division) -> f64 {
    if division == Division::Metrical(0) {
        log::warn!("Division of zero ticks per quarter note, every offset resolves to 0");
    }

    tracks
        .iter_mut()
        .map(|track| resolve_track(track, division))
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::{micros_to_ticks, resolve, resolve_track, ticks_to_micros};
    use crate::chunk::{
        header::{Division, SmpteTicks},
        track::{
            channel::{ChannelEvent, ChannelMessage},
            meta::MetaEvent,
            MTrkEvent, TrackChunk,
        },
    };

    fn note(delta_time: u32, velocity: u8) -> MTrkEvent {
        let message = ChannelMessage::NoteOn { key: 60, velocity };
        MTrkEvent::new(
            delta_time,
            ChannelEvent::new(0, message).expect("Valid note"),
        )
    }

    fn offsets(track: &TrackChunk) -> Vec<f64> {
        track
            .events()
            .iter()
            .map(MTrkEvent::microsecond_offset)
            .collect()
    }

    #[test]
    fn default_tempo_resolves_quarter_notes() {
        let mut track = TrackChunk::from(vec![note(0, 100), note(480, 0)]);

        let end = resolve_track(&mut track, Division::Metrical(120));

        assert_eq!(offsets(&track), vec![0.0, 2_000_000.0]);
        assert_eq!(end, 2_000_000.0);
    }

    #[test]
    fn tempo_change_only_affects_later_events() {
        let mut track = TrackChunk::from(vec![
            note(0, 100),
            MTrkEvent::new(120, MetaEvent::Tempo(300_000)),
            note(120, 100),
        ]);

        resolve_track(&mut track, Division::Metrical(120));

        assert_eq!(offsets(&track), vec![0.0, 500_000.0, 800_000.0]);
    }

    #[test]
    fn tempo_resets_per_track() {
        let mut tracks = vec![
            TrackChunk::from(vec![
                MTrkEvent::new(0, MetaEvent::Tempo(250_000)),
                note(120, 100),
            ]),
            TrackChunk::from(vec![note(120, 100)]),
        ];

        let duration = resolve(&mut tracks, Division::Metrical(120));

        assert_eq!(offsets(&tracks[0]), vec![0.0, 250_000.0]);
        assert_eq!(offsets(&tracks[1]), vec![500_000.0]);
        assert_eq!(duration, 500_000.0);
    }

    #[test]
    fn time_code_ignores_tempo() {
        let mut track = TrackChunk::from(vec![
            MTrkEvent::new(0, MetaEvent::Tempo(250_000)),
            note(100, 100),
        ]);

        resolve_track(&mut track, Division::TimeCodeBased(SmpteTicks::new(25, 40)));

        assert_eq!(offsets(&track), vec![0.0, 100_000.0]);
    }

    #[test]
    fn zero_resolution_resolves_to_zero() {
        let mut tracks = vec![TrackChunk::from(vec![note(480, 100)])];

        assert_eq!(resolve(&mut tracks, Division::Metrical(0)), 0.0);
        assert_eq!(offsets(&tracks[0]), vec![0.0]);
    }

    #[test]
    fn tick_conversions() {
        assert_eq!(ticks_to_micros(96, 96, Some(600_000)), 600_000.0);
        assert_eq!(micros_to_ticks(2_000_000.0, 120, None), 480);
        assert_eq!(micros_to_ticks(300_000.0, 96, Some(600_000)), 48);
    }
}
