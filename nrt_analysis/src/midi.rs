// MIDI export of traced progressions.
//
// Writes a sequence of triads as root-position block chords to a Standard
// MIDI File (SMF format 1): track 0 carries the tempo, track 1 the chords.
// Each chord lasts `quarters_per_chord` quarter notes and starts as soon as
// the previous one is released.
//
// Uses the `midly` crate for encoding. Pitch and velocity ranges come from a
// validated `MidiExportConfig`, so every value fits in 7 bits.

use crate::config::{ConfigError, MidiExportConfig};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use nrt_core::Triad;
use std::path::Path;
use thiserror::Error;

/// Ticks per quarter note in MIDI output.
const TICKS_PER_QUARTER: u16 = 480;

const CHORD_CHANNEL: u8 = 0;

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("nothing to export: the progression is empty")]
    Empty,

    #[error("failed to write MIDI file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Convert `triads` to MIDI and write them to `path`.
pub fn write_progression_midi(
    triads: &[Triad],
    config: &MidiExportConfig,
    path: &Path,
) -> Result<(), MidiError> {
    if triads.is_empty() {
        return Err(MidiError::Empty);
    }
    let smf = progression_to_smf(triads, config)?;
    let mut buf = Vec::new();
    smf.write_std(&mut buf)?;
    std::fs::write(path, &buf)?;
    Ok(())
}

/// MIDI keys of a triad in root position, root in `octave`. The octave must
/// be at most `MAX_OCTAVE`.
pub(crate) fn chord_keys(triad: Triad, octave: u8) -> [u8; 3] {
    let root = (octave + 1) * 12 + triad.root();
    [root, root + triad.quality().third(), root + 7]
}

/// Convert `triads` to an in-memory SMF. Fails if `config` holds values that
/// do not fit in MIDI's 7-bit keys or 24-bit tempo.
pub fn progression_to_smf(
    triads: &[Triad],
    config: &MidiExportConfig,
) -> Result<Smf<'static>, MidiError> {
    config.validate()?;
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo
    let tempo_microseconds = 60_000_000 / u32::from(config.tempo_bpm);
    let tempo_track: Track<'static> = vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(tempo_microseconds))),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        },
    ];
    smf.tracks.push(tempo_track);

    // Track 1: block chords
    let channel = u4::new(CHORD_CHANNEL);
    let chord_ticks = u32::from(config.quarters_per_chord) * u32::from(TICKS_PER_QUARTER);
    let mut track: Track<'static> = Vec::new();
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(b"Chords")),
    });
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Midi {
            channel,
            message: MidiMessage::ProgramChange {
                program: u7::new(config.program),
            },
        },
    });

    for &triad in triads {
        let keys = chord_keys(triad, config.octave);
        for key in keys {
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key: u7::new(key),
                        vel: u7::new(config.velocity),
                    },
                },
            });
        }
        // The first release carries the chord's duration; the rest are
        // simultaneous.
        for (i, key) in keys.into_iter().enumerate() {
            let delta = if i == 0 { chord_ticks } else { 0 };
            track.push(TrackEvent {
                delta: u28::new(delta),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key: u7::new(key),
                        vel: u7::new(0),
                    },
                },
            });
        }
    }

    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    Ok(smf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MIN_TEMPO_BPM;

    fn count_note_ons(track: &Track<'_>) -> usize {
        track
            .iter()
            .filter(|event| {
                matches!(
                    event.kind,
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { .. },
                        ..
                    }
                )
            })
            .count()
    }

    #[test]
    fn test_chord_keys() {
        assert_eq!(chord_keys(Triad::major(0), 4), [60, 64, 67]);
        assert_eq!(chord_keys(Triad::minor(9), 3), [57, 60, 64]);
        assert_eq!(chord_keys(Triad::major(11), 8), [119, 123, 126]);
    }

    #[test]
    fn test_progression_to_smf_basic() {
        let triads = [Triad::major(0), Triad::minor(9), Triad::major(9)];
        let smf = progression_to_smf(&triads, &MidiExportConfig::default()).unwrap();
        // Tempo track + chord track.
        assert_eq!(smf.tracks.len(), 2);
        assert_eq!(count_note_ons(&smf.tracks[1]), 9);
    }

    #[test]
    fn test_chord_duration() {
        let config = MidiExportConfig {
            quarters_per_chord: 3,
            ..MidiExportConfig::default()
        };
        let smf = progression_to_smf(&[Triad::major(0)], &config).unwrap();
        let total_ticks: u32 = smf.tracks[1].iter().map(|e| e.delta.as_int()).sum();
        assert_eq!(total_ticks, 3 * u32::from(TICKS_PER_QUARTER));
    }

    #[test]
    fn test_write_progression_midi() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("progression.mid");
        write_progression_midi(
            &[Triad::major(0), Triad::minor(4)],
            &MidiExportConfig::default(),
            &path,
        )
        .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
    }

    #[test]
    fn test_write_empty_progression_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.mid");
        let result = write_progression_midi(&[], &MidiExportConfig::default(), &path);
        assert!(matches!(result, Err(MidiError::Empty)));
        assert!(!path.exists());
    }

    fn tempo_of(smf: &Smf<'_>) -> Option<u32> {
        smf.tracks[0].iter().find_map(|event| match event.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(tempo)) => Some(tempo.as_int()),
            _ => None,
        })
    }

    #[test]
    fn test_slowest_tempo_fits_in_24_bits() {
        let config = MidiExportConfig {
            tempo_bpm: MIN_TEMPO_BPM,
            ..MidiExportConfig::default()
        };
        let smf = progression_to_smf(&[Triad::major(0)], &config).unwrap();
        assert_eq!(tempo_of(&smf), Some(15_000_000));
    }

    #[test]
    fn test_tempo_below_minimum_is_rejected() {
        for tempo_bpm in 1..MIN_TEMPO_BPM {
            let config = MidiExportConfig {
                tempo_bpm,
                ..MidiExportConfig::default()
            };
            let result = progression_to_smf(&[Triad::major(0)], &config);
            assert!(matches!(result, Err(MidiError::Config(_))), "tempo {tempo_bpm}");
        }
    }

    #[test]
    fn test_out_of_range_octave_is_rejected() {
        let config = MidiExportConfig {
            octave: 20,
            ..MidiExportConfig::default()
        };
        let result = progression_to_smf(&[Triad::major(11)], &config);
        assert!(matches!(result, Err(MidiError::Config(_))));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("octave.mid");
        let result = write_progression_midi(&[Triad::major(0)], &config, &path);
        assert!(matches!(result, Err(MidiError::Config(_))));
        assert!(!path.exists());
    }
}
