// Progression parsing and pairwise PRL analysis.
//
// A progression is a list of triads. Text input uses one "<note> <quality>"
// entry per chord, separated by the configured separator (default "|"):
//
//     C major | A minor | A major | F# minor
//
// Each adjacent pair is analysed independently: `find_path` gives the
// operator sequence and `trace` the chord-by-chord route. The result is a
// `ProgressionReport`, which renders as text or serializes to JSON; printing
// is left to the caller.
//
// See also: `voicing.rs`, which builds progressions from pitch sets and note
// events instead of text.

use crate::config::AnalysisConfig;
use nrt_core::{Operator, Triad, TriadError, compose, find_path, trace, walk};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Parse a separator-delimited progression. Blank input is an empty
/// progression; a blank entry between separators is malformed.
pub fn parse_progression(text: &str, separator: &str) -> Result<Vec<Triad>, TriadError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    if separator.is_empty() {
        return Ok(vec![text.parse()?]);
    }
    text.split(separator).map(str::parse::<Triad>).collect()
}

/// Search every adjacent pair of `chords`, in order. Unchanged pairs are kept.
pub fn analyze_pairs(chords: &[Triad]) -> Vec<PairAnalysis> {
    chords
        .windows(2)
        .map(|pair| PairAnalysis::search(pair[0], pair[1]))
        .collect()
}

/// The transformation between one adjacent pair of chords.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairAnalysis {
    pub from: Triad,
    pub to: Triad,
    /// Shortest operator sequence, or `None` if no transformation was found.
    pub path: Option<Vec<Operator>>,
    /// Rendered chords along the path, `from` first. Empty when `path` is `None`.
    pub chords: Vec<String>,
}

impl PairAnalysis {
    /// Search for the shortest path from `from` to `to`.
    pub fn search(from: Triad, to: Triad) -> Self {
        let path = find_path(from, to);
        let chords = path
            .as_deref()
            .map(|ops| trace(from, ops))
            .unwrap_or_default();
        PairAnalysis {
            from,
            to,
            path,
            chords,
        }
    }

    /// Replay an explicit operator sequence from `from`; `to` is wherever it
    /// lands.
    pub fn replay(from: Triad, path: Vec<Operator>) -> Self {
        let to = compose(from, &path);
        let chords = trace(from, &path);
        PairAnalysis {
            from,
            to,
            path: Some(path),
            chords,
        }
    }

    /// Both chords are the same triad.
    pub fn is_unchanged(&self) -> bool {
        matches!(self.path.as_deref(), Some([]))
    }

    /// Operator labels joined with " -> ", e.g. "L -> R".
    pub fn path_labels(&self) -> Option<String> {
        self.path.as_ref().map(|ops| {
            ops.iter()
                .map(|op| op.label())
                .collect::<Vec<_>>()
                .join(" -> ")
        })
    }

    /// One-line description, e.g. "C major -> A minor: R".
    pub fn summary(&self) -> String {
        let outcome = match self.path_labels() {
            None => "no transformation found".to_string(),
            Some(labels) if labels.is_empty() => "no change".to_string(),
            Some(labels) => labels,
        };
        format!("{} -> {}: {}", self.from, self.to, outcome)
    }

    /// Triads along the path, `from` first. Just `from` when no path exists.
    pub fn triads(&self) -> Vec<Triad> {
        match &self.path {
            Some(ops) => walk(self.from, ops),
            None => vec![self.from],
        }
    }
}

/// Pairwise analysis of a whole progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressionReport {
    /// The input progression.
    pub chords: Vec<Triad>,
    pub pairs: Vec<PairAnalysis>,
}

impl ProgressionReport {
    /// Analyse every adjacent pair of `chords`, dropping unchanged pairs if
    /// the config asks for it.
    pub fn analyze(chords: Vec<Triad>, config: &AnalysisConfig) -> Self {
        let mut pairs = analyze_pairs(&chords);
        if config.skip_unchanged {
            pairs.retain(|analysis| !analysis.is_unchanged());
        }
        debug!(
            chords = chords.len(),
            pairs = pairs.len(),
            "analysed progression"
        );
        ProgressionReport { chords, pairs }
    }

    /// A report holding exactly one pair, searched or replayed. Always kept,
    /// even when unchanged.
    pub fn from_pair(analysis: PairAnalysis) -> Self {
        ProgressionReport {
            chords: vec![analysis.from, analysis.to],
            pairs: vec![analysis],
        }
    }

    /// Two lines per pair: the summary, then the traced chords.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for pair in &self.pairs {
            out.push_str(&pair.summary());
            out.push('\n');
            if !pair.chords.is_empty() {
                out.push_str("  ");
                out.push_str(&pair.chords.join(" | "));
                out.push('\n');
            }
        }
        out
    }

    /// Every traced triad, pair after pair, without repeating the chord
    /// where one pair ends and the next begins.
    pub fn traced_triads(&self) -> Vec<Triad> {
        let mut triads: Vec<Triad> = Vec::new();
        for pair in &self.pairs {
            let steps = pair.triads();
            let skip = usize::from(triads.last() == steps.first());
            triads.extend(steps.into_iter().skip(skip));
        }
        triads
    }
}
