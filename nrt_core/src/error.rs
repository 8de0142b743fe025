// Error type for building triads and operators from text.
//
// Search itself cannot fail: a missing path is reported as `None` from
// `find_path`, not as an error. These variants cover input validation only,
// and are surfaced to the caller unchanged.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriadError {
    /// A note spelling outside the supported table (e.g. "H").
    #[error("unknown note name {0:?}")]
    UnknownNoteName(String),

    /// A quality token other than major/minor.
    #[error("unknown triad quality {0:?} (expected \"major\" or \"minor\")")]
    UnknownQuality(String),

    /// An operator label other than P, R or L.
    #[error("unknown transformation {0:?} (expected P, R or L)")]
    UnknownOperator(String),

    /// A chord entry that is not exactly "<note> <quality>".
    #[error("malformed chord entry {0:?} (expected \"<note> <quality>\", e.g. \"C major\")")]
    MalformedProgressionEntry(String),
}
