//! Pure detection algorithms
//!
//! Everything here is a deterministic function of its inputs: no I/O, no
//! shared mutable state, no clocks. The application layer wires these
//! pieces into the per-window pipeline.

pub mod boundary;
pub mod candidate;
pub mod compose;
pub mod expr;
pub mod matcher;
pub mod overlap;
pub mod span;

pub use boundary::{Boundaries, BoundaryKind, BoundarySpan, SentenceIter};
pub use candidate::MatchCandidate;
pub use expr::{Bindings, EvalError, FormulaSyntaxError};
pub use overlap::DEFAULT_FAMILY_PRIORITY;
