//! Error types for graph construction and execution.
//!
//! All errors implement `std::error::Error` via `thiserror`. The engine
//! distinguishes exactly the kinds laid out in the error-handling design:
//! a wire breaking its contract, a user callable failing, and (not an
//! error at all, just an empty result) a `step()` observed while
//! cancelled. There is no retry policy and no automatic recovery — both
//! kinds propagate to the caller of [`Stepper::step`](crate::stepper::Stepper::step)
//! unchanged.

use crate::unit::UnitId;
use std::fmt;

/// Boxed source error from a user callable or wire. Kept as a trait object
/// rather than a generic parameter on `Unit`/`Edge` so that a `Graph` can
/// hold units wrapping unrelated callable types uniformly.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A plain string error for callables/wires that don't need a richer type.
#[derive(Debug)]
pub struct Message(pub String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for Message {}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message(s)
    }
}

/// Errors surfaced by graph construction and by the [`Stepper`](crate::stepper::Stepper).
///
/// Seeding `prepare` with a unit that is not registered in the graph is
/// deliberately not an error: it produces a single leaf stash entry and
/// terminates, treated as allowed behavior rather than a failure.
/// Likewise a cancelled `step()` is not an error — it simply returns an
/// empty row set.
#[derive(Debug, thiserror::Error)]
pub enum HyperwayError {
    /// A wire returned something that could not be treated as an
    /// `ArgPack`. Aborts the current `step()`; the queue is left in a
    /// well-defined partial state for inspection.
    #[error("wire on edge {edge:?} violated its contract: {reason}")]
    WireContractViolation {
        edge: crate::edge::EdgeId,
        reason: String,
    },

    /// A user callable raised. The offending row has already been
    /// consumed; its successors are never enqueued.
    #[error("unit {unit:?} invocation failed: {source}")]
    CallableFailure {
        unit: UnitId,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, HyperwayError>;
