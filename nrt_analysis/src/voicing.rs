// Building triad progressions from sounding pitches.
//
// Chord identification (pitch set -> root + quality) sits behind the
// `ChordIdentifier` trait so a richer external service can be plugged in.
// The bundled `TriadIdentifier` only recognizes plain major and minor triads
// in any inversion or doubling; everything else (dyads, diminished and
// augmented triads, sevenths, clusters) is "not a recognizable triad".
//
// Two input shapes feed it:
// - Voicings: explicit pitch groups, e.g. "60 64 67 | 57 60 64".
// - Note events: an on/off stream, one event per line:
//
//       on 60 90     # key, optional velocity
//       on 64
//       off 60
//
//   `NoteTracker` keeps the set of sounding keys; after every event that
//   leaves notes sounding, the current set is identified. A note-on with
//   velocity 0 is a note-off, as in MIDI.
//
// With `collapse_repeats`, consecutive identical chords are merged, so a
// chord that is re-identified on every note event counts once.

use nrt_core::{Quality, Triad};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Velocity used for "on <key>" lines without an explicit velocity.
pub const DEFAULT_VELOCITY: u8 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoicingError {
    #[error("line {line}: malformed note event {text:?} (expected \"on <key> [velocity]\" or \"off <key>\")")]
    MalformedEvent { line: usize, text: String },

    #[error("invalid MIDI value {0:?} (expected an integer 0-127)")]
    InvalidMidiValue(String),
}

/// Maps simultaneous MIDI pitches to a triad, or `None` if they do not form
/// one.
pub trait ChordIdentifier {
    fn identify(&self, pitches: &[u8]) -> Option<Triad>;
}

/// Recognizes major and minor triads: at least three pitches spanning
/// exactly three pitch classes that stack as root, third and fifth.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriadIdentifier;

impl ChordIdentifier for TriadIdentifier {
    fn identify(&self, pitches: &[u8]) -> Option<Triad> {
        if pitches.len() < 3 {
            return None;
        }
        let mut present = [false; 12];
        for &pitch in pitches {
            present[(pitch % 12) as usize] = true;
        }
        let classes: Vec<u8> = (0..12u8).filter(|&pc| present[pc as usize]).collect();
        if classes.len() != 3 {
            return None;
        }
        classes.iter().find_map(|&root| {
            Quality::ALL.into_iter().find_map(|quality| {
                let candidate = Triad::new(root, quality);
                let mut chord = candidate.pitch_classes();
                chord.sort_unstable();
                (chord[..] == classes[..]).then_some(candidate)
            })
        })
    }
}

/// A note-on or note-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoteEvent {
    On { key: u8, velocity: u8 },
    Off { key: u8 },
}

/// The set of currently sounding keys.
#[derive(Debug, Clone, Default)]
pub struct NoteTracker {
    active: BTreeSet<u8>,
}

impl NoteTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::On { key, velocity } if velocity > 0 => {
                self.active.insert(key);
            }
            NoteEvent::On { key, .. } | NoteEvent::Off { key } => {
                self.active.remove(&key);
            }
        }
    }

    /// Sounding keys, lowest first.
    pub fn active_pitches(&self) -> Vec<u8> {
        self.active.iter().copied().collect()
    }

    pub fn is_silent(&self) -> bool {
        self.active.is_empty()
    }
}

fn parse_midi_value(token: &str) -> Result<u8, VoicingError> {
    match token.parse::<u8>() {
        Ok(value) if value <= 127 => Ok(value),
        _ => Err(VoicingError::InvalidMidiValue(token.to_string())),
    }
}

/// Parse a note-event log. Blank lines and `#` comments are skipped.
pub fn parse_events(text: &str) -> Result<Vec<NoteEvent>, VoicingError> {
    let mut events = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let malformed = || VoicingError::MalformedEvent {
            line: index + 1,
            text: line.to_string(),
        };
        let event = match tokens.as_slice() {
            [kind, key] if kind.eq_ignore_ascii_case("on") => NoteEvent::On {
                key: parse_midi_value(key)?,
                velocity: DEFAULT_VELOCITY,
            },
            [kind, key, velocity] if kind.eq_ignore_ascii_case("on") => NoteEvent::On {
                key: parse_midi_value(key)?,
                velocity: parse_midi_value(velocity)?,
            },
            [kind, key] if kind.eq_ignore_ascii_case("off") => NoteEvent::Off {
                key: parse_midi_value(key)?,
            },
            _ => return Err(malformed()),
        };
        events.push(event);
    }
    Ok(events)
}

/// Parse separator-delimited pitch groups, e.g. "60 64 67 | 57 60 64".
/// Blank groups are skipped.
pub fn parse_voicings(text: &str, separator: &str) -> Result<Vec<Vec<u8>>, VoicingError> {
    let groups: Vec<&str> = if separator.is_empty() {
        vec![text]
    } else {
        text.split(separator).collect()
    };
    groups
        .into_iter()
        .filter(|group| !group.trim().is_empty())
        .map(|group| {
            group
                .split_whitespace()
                .map(parse_midi_value)
                .collect::<Result<Vec<u8>, _>>()
        })
        .collect()
}

fn push_chord(progression: &mut Vec<Triad>, triad: Triad, collapse_repeats: bool) {
    if collapse_repeats && progression.last() == Some(&triad) {
        return;
    }
    progression.push(triad);
}

/// Identify each pitch group in turn. Groups that are not triads are skipped.
pub fn progression_from_voicings(
    voicings: &[Vec<u8>],
    identifier: &impl ChordIdentifier,
    collapse_repeats: bool,
) -> Vec<Triad> {
    let mut progression = Vec::new();
    for (index, pitches) in voicings.iter().enumerate() {
        match identifier.identify(pitches) {
            Some(triad) => push_chord(&mut progression, triad, collapse_repeats),
            None => warn!(group = index + 1, ?pitches, "skipping voicing that is not a major or minor triad"),
        }
    }
    progression
}

/// Replay note events, identifying the sounding notes after each event.
pub fn progression_from_events(
    events: &[NoteEvent],
    identifier: &impl ChordIdentifier,
    collapse_repeats: bool,
) -> Vec<Triad> {
    let mut tracker = NoteTracker::new();
    let mut progression = Vec::new();
    for &event in events {
        tracker.apply(event);
        if tracker.is_silent() {
            continue;
        }
        let pitches = tracker.active_pitches();
        match identifier.identify(&pitches) {
            Some(triad) => push_chord(&mut progression, triad, collapse_repeats),
            None => debug!(?pitches, "sounding notes are not a triad"),
        }
    }
    progression
}
