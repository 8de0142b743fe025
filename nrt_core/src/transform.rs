// PRL operators and shortest-path search over the triad graph.
//
// The graph has one node per triad (24 total) and, from each node, one edge
// per operator. It is never materialized: `neighbors` generates the three
// edges of a node on demand and `find_path` runs a breadth-first search over
// them.
//
// Search discipline:
// - FIFO queue of (triad, path-so-far); every edge has unit cost.
// - A triad is marked visited when it is dequeued, not when it is enqueued.
//   The same triad may sit in the queue more than once; later copies are
//   dropped on dequeue, so the first (shortest, earliest) path wins.
// - Operators are examined in the fixed order P, R, L at every node.
// - An operator that maps a triad to itself is never enqueued as a step.
//   None of P, R, L do this for major/minor triads, but the search does not
//   rely on it.
//
// Together these make the result both minimum-length and reproducible: the
// same (start, end) pair always yields the same operator sequence.
//
// The graph is connected with diameter 5, so `None` is unreachable in
// practice. It is still a representable outcome and is logged as an error.

use crate::error::TriadError;
use crate::triad::{Quality, Triad};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, error, trace as trace_event};

/// The three Neo-Riemannian operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Parallel: same root, opposite quality (C major <-> C minor).
    P,
    /// Relative: C major <-> A minor.
    R,
    /// Leading-tone exchange: C major <-> E minor.
    L,
}

impl Operator {
    /// Search order. Changing it changes which of several equal-length paths
    /// `find_path` returns.
    pub const ALL: [Operator; 3] = [Operator::P, Operator::R, Operator::L];

    pub fn label(self) -> &'static str {
        match self {
            Operator::P => "P",
            Operator::R => "R",
            Operator::L => "L",
        }
    }

    pub fn full_name(self) -> &'static str {
        match self {
            Operator::P => "Parallel",
            Operator::R => "Relative",
            Operator::L => "Leading-tone exchange",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Operator {
    type Err = TriadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "p" | "parallel" => Ok(Operator::P),
            "r" | "relative" => Ok(Operator::R),
            "l" | "leading-tone" | "leittonwechsel" => Ok(Operator::L),
            _ => Err(TriadError::UnknownOperator(s.to_string())),
        }
    }
}

/// Apply one operator to a triad. Total and deterministic.
pub fn apply(triad: Triad, op: Operator) -> Triad {
    let root = triad.root();
    match (op, triad.quality()) {
        (Operator::P, quality) => Triad::new(root, quality.toggled()),
        (Operator::R, Quality::Major) => Triad::new(root + 9, Quality::Minor),
        (Operator::R, Quality::Minor) => Triad::new(root + 3, Quality::Major),
        (Operator::L, Quality::Major) => Triad::new(root + 4, Quality::Minor),
        (Operator::L, Quality::Minor) => Triad::new(root + 8, Quality::Major),
    }
}

impl Triad {
    /// Method form of [`apply`].
    pub fn apply(self, op: Operator) -> Triad {
        apply(self, op)
    }
}

/// The outgoing edges of `triad`, in search order.
pub fn neighbors(triad: Triad) -> [(Operator, Triad); 3] {
    Operator::ALL.map(|op| (op, apply(triad, op)))
}

/// Find a shortest operator sequence taking `start` to `end`.
///
/// Returns `Some(vec![])` when `start == end`, and `None` only if the search
/// exhausts the graph without reaching `end`.
pub fn find_path(start: Triad, end: Triad) -> Option<Vec<Operator>> {
    let mut visited = [false; Triad::COUNT];
    let mut queue: VecDeque<(Triad, Vec<Operator>)> = VecDeque::new();
    queue.push_back((start, Vec::new()));

    while let Some((current, path)) = queue.pop_front() {
        if visited[current.index()] {
            continue;
        }
        visited[current.index()] = true;

        if current == end {
            debug!(%start, %end, steps = path.len(), "found transformation path");
            return Some(path);
        }

        for (op, next) in neighbors(current) {
            if next == current || visited[next.index()] {
                continue;
            }
            trace_event!(from = %current, to = %next, op = op.label(), depth = path.len() + 1, "enqueue");
            let mut next_path = Vec::with_capacity(path.len() + 1);
            next_path.extend_from_slice(&path);
            next_path.push(op);
            queue.push_back((next, next_path));
        }
    }

    error!(%start, %end, "PRL search exhausted the triad graph without reaching the target");
    None
}

/// Fold `path` over `start`, returning the final triad.
pub fn compose(start: Triad, path: &[Operator]) -> Triad {
    path.iter().fold(start, |triad, &op| apply(triad, op))
}

/// Every triad visited while replaying `path`, starting with `start`.
/// Length is `path.len() + 1`.
pub fn walk(start: Triad, path: &[Operator]) -> Vec<Triad> {
    let mut triads = Vec::with_capacity(path.len() + 1);
    let mut current = start;
    triads.push(current);
    for &op in path {
        current = apply(current, op);
        triads.push(current);
    }
    triads
}

/// Rendered chord names along `path`, starting with `start`.
pub fn trace(start: Triad, path: &[Operator]) -> Vec<String> {
    walk(start, path).iter().map(Triad::to_string).collect()
}
