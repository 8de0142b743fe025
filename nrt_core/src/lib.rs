// Neo-Riemannian triad transformations.
//
// Models major/minor triads as (root pitch class, quality) pairs and searches
// the 24-node graph induced by the three PRL operators (Parallel, Relative,
// Leading-tone exchange) for a shortest operator sequence between two triads.
//
// Module overview:
// - triad.rs:     `Triad` and `Quality` value types, note-name <-> pitch-class
//                 mapping, text parsing and canonical rendering
// - transform.rs: `Operator`, `apply`, breadth-first `find_path`, and the
//                 `walk`/`trace`/`compose` replay helpers
// - error.rs:     `TriadError` for rejected note names, qualities, operators
//                 and malformed chord entries
//
// Everything here is a pure function over small fixed-size data. No I/O, no
// shared state, no randomness: the same inputs always produce the same path.
// The analysis crate (`nrt_analysis`) builds progressions, chord
// identification and output formats on top of this.

pub mod error;
pub mod transform;
pub mod triad;

pub use error::TriadError;
pub use transform::{Operator, apply, compose, find_path, neighbors, trace, walk};
pub use triad::{NOTE_NAMES, Quality, Triad, note_to_pitch_class, pitch_class_name};
