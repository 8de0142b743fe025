// nrt_analysis: chord progressions read as Neo-Riemannian transformations.
//
// Builds on `nrt_core` (triads, PRL operators, shortest-path search) to turn
// the ways a user can describe music into triad progressions, analyse each
// adjacent pair, and present the result.
//
// Module overview:
// - config.rs:      `AnalysisConfig`, JSON-loaded settings with defaults
// - progression.rs: pipe-delimited progression parsing, `PairAnalysis` and
//                   `ProgressionReport` (text and JSON friendly)
// - voicing.rs:     `ChordIdentifier` seam, `TriadIdentifier`, note-event
//                   tracking, progressions from pitch groups and event logs
// - midi.rs:        SMF export of traced progressions via `midly`
//
// The `nrt` binary (`main.rs`) is a thin CLI over these modules.

pub mod config;
pub mod midi;
pub mod progression;
pub mod voicing;

pub use config::AnalysisConfig;
pub use progression::{PairAnalysis, ProgressionReport, analyze_pairs, parse_progression};
