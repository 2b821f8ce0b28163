//! Pluggable "expand" strategy: the operation that concatenates
//! the successor rows emitted by each input row, across all input rows,
//! into the next queue.
//!
//! Two implementations are provided and must produce identical ordering:
//! a concatenation-of-sequences form, and an
//! accumulate-then-freeze form. The latter is the default — it avoids an
//! intermediate `Vec<Vec<Row>>` by reusing one growing buffer — but
//! switching between them must never change observable output, so the
//! strategy is an injected function on the [`Stepper`](crate::stepper::Stepper)
//! rather than global mutable state.

use crate::row::Row;
use std::fmt;
use std::sync::Arc;

/// A function from "successor rows per input row" to "the next queue, in
/// order". Boxed so it can be swapped per-`Stepper` without a generic
/// parameter leaking through the whole API.
pub type ExpandFn = Arc<dyn Fn(Vec<Vec<Row>>) -> Vec<Row> + Send + Sync>;

/// The injected expand strategy on a [`Stepper`](crate::stepper::Stepper).
#[derive(Clone)]
pub struct ExpandStrategy(ExpandFn);

impl fmt::Debug for ExpandStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ExpandStrategy(<fn>)")
    }
}

impl ExpandStrategy {
    pub fn new(f: ExpandFn) -> Self {
        ExpandStrategy(f)
    }

    pub fn apply(&self, per_row: Vec<Vec<Row>>) -> Vec<Row> {
        (self.0)(per_row)
    }

    /// Sequence-concatenation form: builds a fresh `Vec` and `extend`s it
    /// once per input row's successor list, in order.
    pub fn concat() -> Self {
        ExpandStrategy::new(Arc::new(|per_row: Vec<Vec<Row>>| {
            let mut next = Vec::with_capacity(per_row.iter().map(Vec::len).sum());
            for successors in per_row {
                next.extend(successors);
            }
            next
        }))
    }

    /// Accumulate-then-freeze form: pushes every successor row into one
    /// buffer as it's produced, rather than allocating a `Vec` per input
    /// row first. The default, for performance — the allocation pattern
    /// differs from [`ExpandStrategy::concat`] but the resulting order is
    /// identical.
    pub fn accumulate_then_freeze() -> Self {
        ExpandStrategy::new(Arc::new(|per_row: Vec<Vec<Row>>| {
            let mut buffer = Vec::new();
            for mut successors in per_row {
                buffer.append(&mut successors);
            }
            buffer
        }))
    }
}

impl Default for ExpandStrategy {
    fn default() -> Self {
        ExpandStrategy::accumulate_then_freeze()
    }
}
