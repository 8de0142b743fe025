// Major and minor triads identified by root pitch class.
//
// A `Triad` is an immutable (root, quality) pair. Roots are equal-tempered
// pitch classes 0-11 (0 = C) and enharmonic spellings collapse to the same
// integer, so "C#" and "Db" build identical triads and both render as "C#".
// Only major and minor qualities are representable.
//
// Note names are accepted in sharp, flat ("Db") and hyphen-flat ("D-") form;
// hyphen flats are what music21-style chord identifiers emit. Rendering always
// uses the sharp-based table in `NOTE_NAMES`.
//
// `Triad::index` packs a triad into 0..24 so the search in `transform.rs` can
// keep its visited set in a fixed array instead of a hash set.

use crate::error::TriadError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical display spelling for each pitch class.
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Every accepted spelling with its pitch class.
const SPELLINGS: &[(&str, u8)] = &[
    ("C", 0),
    ("B#", 0),
    ("C#", 1),
    ("Db", 1),
    ("D-", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E-", 3),
    ("E", 4),
    ("Fb", 4),
    ("F-", 4),
    ("E#", 5),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G-", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A-", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B-", 10),
    ("B", 11),
    ("Cb", 11),
    ("C-", 11),
];

/// Map a note name to its pitch class (0 = C ... 11 = B).
pub fn note_to_pitch_class(name: &str) -> Result<u8, TriadError> {
    SPELLINGS
        .iter()
        .find(|(spelling, _)| *spelling == name)
        .map(|&(_, pc)| pc)
        .ok_or_else(|| TriadError::UnknownNoteName(name.to_string()))
}

/// Sharp-based name of a pitch class. Values above 11 wrap.
pub fn pitch_class_name(pc: u8) -> &'static str {
    NOTE_NAMES[(pc % 12) as usize]
}

/// Triad quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Major,
    Minor,
}

impl Quality {
    pub const ALL: [Quality; 2] = [Quality::Major, Quality::Minor];

    /// Major <-> minor.
    pub fn toggled(self) -> Self {
        match self {
            Quality::Major => Quality::Minor,
            Quality::Minor => Quality::Major,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Major => "major",
            Quality::Minor => "minor",
        }
    }

    /// Semitones from the root to the third.
    pub fn third(self) -> u8 {
        match self {
            Quality::Major => 4,
            Quality::Minor => 3,
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = TriadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("major") {
            Ok(Quality::Major)
        } else if s.eq_ignore_ascii_case("minor") {
            Ok(Quality::Minor)
        } else {
            Err(TriadError::UnknownQuality(s.to_string()))
        }
    }
}

/// A major or minor triad. Equality is structural on (root, quality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "TriadFields")]
pub struct Triad {
    root: u8,
    quality: Quality,
}

/// Deserialization shape; routed through `Triad::new` so the root is reduced
/// mod 12 even for hand-written JSON.
#[derive(Deserialize)]
struct TriadFields {
    root: u8,
    quality: Quality,
}

impl From<TriadFields> for Triad {
    fn from(fields: TriadFields) -> Self {
        Triad::new(fields.root, fields.quality)
    }
}

impl Triad {
    /// Number of distinct triads (12 roots x 2 qualities).
    pub const COUNT: usize = 24;

    /// Build a triad. The root is taken mod 12.
    pub fn new(root: u8, quality: Quality) -> Self {
        Triad {
            root: root % 12,
            quality,
        }
    }

    pub fn major(root: u8) -> Self {
        Triad::new(root, Quality::Major)
    }

    pub fn minor(root: u8) -> Self {
        Triad::new(root, Quality::Minor)
    }

    /// Build a triad from a note name and a quality token, e.g. ("Db", "minor").
    pub fn from_names(note: &str, quality: &str) -> Result<Self, TriadError> {
        Ok(Triad::new(note_to_pitch_class(note)?, quality.parse()?))
    }

    pub fn root(self) -> u8 {
        self.root
    }

    pub fn quality(self) -> Quality {
        self.quality
    }

    /// Dense index in 0..24: root * 2, plus 1 for minor.
    pub fn index(self) -> usize {
        let minor = match self.quality {
            Quality::Major => 0,
            Quality::Minor => 1,
        };
        self.root as usize * 2 + minor
    }

    /// All 24 triads, by root, major before minor.
    pub fn all() -> impl Iterator<Item = Triad> {
        (0..12u8).flat_map(|root| Quality::ALL.into_iter().map(move |q| Triad::new(root, q)))
    }

    /// Pitch classes of the root-position chord: root, third, fifth.
    pub fn pitch_classes(self) -> [u8; 3] {
        [
            self.root,
            (self.root + self.quality.third()) % 12,
            (self.root + 7) % 12,
        ]
    }
}

impl fmt::Display for Triad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", pitch_class_name(self.root), self.quality)
    }
}

impl FromStr for Triad {
    type Err = TriadError;

    /// Parse "<note> <quality>", e.g. "F# minor". Surrounding whitespace is
    /// ignored; any other token count is a malformed entry.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.as_slice() {
            [note, quality] => Triad::from_names(note, quality),
            _ => Err(TriadError::MalformedProgressionEntry(s.trim().to_string())),
        }
    }
}
