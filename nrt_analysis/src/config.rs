// Analysis settings, loaded from JSON.
//
// `AnalysisConfig` holds everything the CLI and the progression/voicing
// pipelines read instead of hard-coding: the progression separator, repeat
// collapsing, whether identity pairs are reported, and the MIDI export
// parameters in `MidiExportConfig`. Every field has a default, and fields
// missing from the JSON file fall back to it, so a config file only needs to
// name what it changes:
//
//     { "skip_unchanged": true, "midi": { "tempo_bpm": 120 } }
//
// Values are validated at load time, and again by `midi.rs` before it builds
// 7-bit and 24-bit MIDI values.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Top-level analysis settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Separator between chord entries in a progression string.
    pub separator: String,
    /// Drop consecutive identical chords when building a progression from
    /// voicings or note events.
    pub collapse_repeats: bool,
    /// Omit pairs whose path is empty (same chord twice) from reports.
    pub skip_unchanged: bool,
    pub midi: MidiExportConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            separator: "|".to_string(),
            collapse_repeats: true,
            skip_unchanged: false,
            midi: MidiExportConfig::default(),
        }
    }
}

/// Parameters for exporting a traced progression as block chords.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MidiExportConfig {
    pub tempo_bpm: u16,
    /// Length of each chord in quarter notes.
    pub quarters_per_chord: u16,
    /// Octave of the chord root (MIDI convention, 4 = middle C's octave).
    pub octave: u8,
    pub velocity: u8,
    /// General MIDI program number (0 = acoustic grand piano).
    pub program: u8,
}

impl Default for MidiExportConfig {
    fn default() -> Self {
        MidiExportConfig {
            tempo_bpm: 90,
            quarters_per_chord: 2,
            octave: 4,
            velocity: 80,
            program: 0,
        }
    }
}

/// Highest root octave whose root-position triads stay within MIDI range.
pub const MAX_OCTAVE: u8 = 8;

/// Slowest tempo whose microseconds-per-quarter fits in MIDI's 24-bit field.
pub const MIN_TEMPO_BPM: u16 = 4;

impl AnalysisConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&data)
    }

    /// Parse and validate a JSON config string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.separator.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "separator must contain a non-whitespace character".to_string(),
            ));
        }
        self.midi.validate()
    }
}

impl MidiExportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tempo_bpm < MIN_TEMPO_BPM {
            return Err(ConfigError::Invalid(format!(
                "midi.tempo_bpm must be at least {MIN_TEMPO_BPM}, got {}",
                self.tempo_bpm
            )));
        }
        if self.quarters_per_chord == 0 {
            return Err(ConfigError::Invalid(
                "midi.quarters_per_chord must be positive".to_string(),
            ));
        }
        if self.octave > MAX_OCTAVE {
            return Err(ConfigError::Invalid(format!(
                "midi.octave must be at most {MAX_OCTAVE}, got {}",
                self.octave
            )));
        }
        if self.velocity == 0 || self.velocity > 127 {
            return Err(ConfigError::Invalid(format!(
                "midi.velocity must be 1-127, got {}",
                self.velocity
            )));
        }
        if self.program > 127 {
            return Err(ConfigError::Invalid(format!(
                "midi.program must be 0-127, got {}",
                self.program
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            AnalysisConfig::from_json(r#"{ "skip_unchanged": true, "midi": { "tempo_bpm": 120 } }"#)
                .unwrap();
        assert!(config.skip_unchanged);
        assert_eq!(config.separator, "|");
        assert!(config.collapse_repeats);
        assert_eq!(config.midi.tempo_bpm, 120);
        assert_eq!(config.midi.quarters_per_chord, 2);
    }

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(AnalysisConfig::from_json("{}").unwrap(), AnalysisConfig::default());
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = AnalysisConfig {
            separator: ";".to_string(),
            midi: MidiExportConfig {
                program: 48,
                ..MidiExportConfig::default()
            },
            ..AnalysisConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(AnalysisConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "separator": "  " }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "midi": { "octave": 9 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "midi": { "velocity": 200 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AnalysisConfig::from_json(r#"{ "midi": { "tempo_bpm": 0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_tempo_lower_bound() {
        for tempo_bpm in [1, 2, 3] {
            let json = format!(r#"{{ "midi": {{ "tempo_bpm": {tempo_bpm} }} }}"#);
            assert!(
                matches!(AnalysisConfig::from_json(&json), Err(ConfigError::Invalid(_))),
                "tempo {tempo_bpm}"
            );
        }
        let config = AnalysisConfig::from_json(r#"{ "midi": { "tempo_bpm": 4 } }"#).unwrap();
        assert_eq!(config.midi.tempo_bpm, MIN_TEMPO_BPM);
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            AnalysisConfig::from_json("{ separator: "),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/nrt-config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
