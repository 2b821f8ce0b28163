//! [`Stepper`] — the cooperative, single-threaded execution driver.

use crate::argpack::ArgPack;
use crate::error::HyperwayError;
use crate::expand::ExpandStrategy;
use crate::graph::Graph;
use crate::row::Row;
use crate::unit::{Unit, UnitId};
use std::collections::HashMap;

/// Accumulated terminal results, keyed by the [`Unit`](crate::unit::Unit)
/// that produced them. A leaf reached via a `Row::Partial` and one
/// reached via a `Row::Unit` use the same key: the unit is the sole,
/// canonical key in both cases, since every row that reaches a leaf
/// resolves to a `Row::Unit` before the leaf check runs.
pub type Stash = HashMap<UnitId, Vec<ArgPack>>;

/// The cooperative single-threaded driver that advances a [`Graph`] one
/// round at a time.
///
/// A `Stepper` owns its row queue and stash exclusively; multiple
/// steppers over the same graph are independent and safe to run
/// concurrently with each other — nothing here reaches back into
/// shared mutable state.
pub struct Stepper<'g> {
    graph: &'g Graph,
    queue: Vec<Row>,
    stash: Stash,
    merge_aware: bool,
    cancelled: bool,
    expand: ExpandStrategy,
    /// Seed units handed to [`Stepper::prepare`] that the graph itself
    /// has never seen via `add`/`chain`. A `Row::Unit` produced from a
    /// `Row::Partial` always targets a unit the graph already knows (it
    /// came from an `Edge` the graph built), so this only ever needs to
    /// carry the unit(s) passed directly to `prepare`.
    seed_units: HashMap<UnitId, Unit>,
}

impl<'g> Stepper<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Stepper {
            graph,
            queue: Vec::new(),
            stash: Stash::new(),
            merge_aware: false,
            cancelled: false,
            expand: ExpandStrategy::default(),
            seed_units: HashMap::new(),
        }
    }

    pub fn with_merge_aware(mut self, merge_aware: bool) -> Self {
        self.merge_aware = merge_aware;
        self
    }

    pub fn with_expand_strategy(mut self, expand: ExpandStrategy) -> Self {
        self.expand = expand;
        self
    }

    /// Seeds the queue with one row: `(start_unit, initial_argpack)`.
    /// `start_unit` does not need to be present in the graph's outgoing
    /// map — that is allowed, and a start with no outgoing edges simply
    /// produces one leaf stash entry on the first `step()`. Since the
    /// graph may never have seen this unit (it need not have been built
    /// via [`Graph::add`]/[`Graph::chain`]), the stepper remembers it
    /// itself so it can still be invoked — with its sentinel and leaf
    /// policy honored — exactly like any other unit row.
    pub fn prepare(&mut self, start_unit: Unit, initial_argpack: ArgPack) {
        let id = start_unit.id();
        self.seed_units.entry(id).or_insert(start_unit);
        self.queue = vec![Row::Unit(id, initial_argpack)];
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub fn queue(&self) -> &[Row] {
        &self.queue
    }

    pub fn stash(&self) -> &Stash {
        &self.stash
    }

    /// Advances the driver by one round, per :
    ///
    /// 1. Snapshot the current queue, clear it.
    /// 2. If `merge_aware`, fold concurrent `Row::Unit` rows targeting the
    ///    same merge-marked unit into one row (row-concat, ).
    /// 3. Resolve each row: a `Row::Unit` invokes its unit and either
    ///    stashes (no outgoing edges) or enqueues one `Row::Partial` per
    ///    outgoing edge; a `Row::Partial` applies its wire and enqueues
    ///    the resulting `Row::Unit`.
    /// 4. The produced rows become the next queue; they are also what is
    ///    returned, so callers can drive to exhaustion by looping until
    ///    the returned set is empty.
    ///
    /// A cancelled stepper returns an empty set without consuming the
    /// queue — the queue is left intact for inspection.
    ///
    /// On a `WireContractViolation` or `CallableFailure` partway through
    /// resolving the snapshot, `step()` aborts but does not discard
    /// state: the queue is left holding the successors already produced
    /// by rows resolved earlier this step, followed by the rows not yet
    /// reached — the "well-defined partial-queue form" callers can
    /// inspect after the error. The row that raised the error is not
    /// re-enqueued; it has already been consumed.
    #[tracing::instrument(level = "debug", skip(self), fields(queue_len = self.queue.len()))]
    pub fn step(&mut self) -> Result<Vec<Row>, HyperwayError> {
        if self.cancelled {
            return Ok(Vec::new());
        }

        let input_rows = std::mem::take(&mut self.queue);
        let input_rows = if self.merge_aware {
            self.fold_merge_groups(input_rows)
        } else {
            input_rows
        };

        let mut per_row = Vec::with_capacity(input_rows.len());
        let mut remaining = input_rows.into_iter();
        while let Some(row) = remaining.next() {
            match self.resolve(row) {
                Ok(successors) => per_row.push(successors),
                Err(err) => {
                    let mut partial_queue = self.expand.apply(per_row);
                    partial_queue.extend(remaining);
                    self.queue = partial_queue;
                    return Err(err);
                }
            }
        }

        let next_queue = self.expand.apply(per_row);
        self.queue = next_queue.clone();
        Ok(next_queue)
    }

    /// Groups `Row::Unit` rows by target unit where that unit is
    /// `merge_node = true`, folding each group's packs into one via
    /// [`ArgPack::merge_fold`] in arrival order. Rows targeting a
    /// non-merge unit, and non-`Unit` rows, pass through untouched.
    ///
    /// The fold happens *in place*: the single row a merge group
    /// collapses into takes the position the group's first row occupied
    /// in `input_rows`, so a non-merge row sitting ahead of or behind a
    /// merge group in the original queue stays ahead of or behind it —
    /// matching "replace the group with a single row" rather than
    /// reshuffling merge rows to the front.
    ///
    /// Folding happens only at the `Row::Unit` boundary, after any
    /// partials targeting this unit have already resolved to unit rows
    /// in a prior step — merging two still-in-flight `Row::Partial`s
    /// before either has reached the unit would require guessing at a
    /// wire's output before it runs.
    fn fold_merge_groups(&self, input_rows: Vec<Row>) -> Vec<Row> {
        let mut first_slot: HashMap<UnitId, usize> = HashMap::new();
        let mut groups: HashMap<UnitId, Vec<ArgPack>> = HashMap::new();
        let mut slots: Vec<Option<Row>> = Vec::with_capacity(input_rows.len());

        for row in input_rows {
            match row.merge_target() {
                Some(target) if self.is_merge_node(target) => {
                    if let Row::Unit(_, pack) = row {
                        groups.entry(target).or_default().push(pack);
                    }
                    // Only the group's first row reserves a slot; later
                    // rows in the same group fold into it without
                    // shifting anything else's position.
                    first_slot.entry(target).or_insert_with(|| {
                        slots.push(None);
                        slots.len() - 1
                    });
                }
                _ => slots.push(Some(row)),
            }
        }

        for (unit, slot) in first_slot {
            let packs = groups.remove(&unit).unwrap_or_default();
            slots[slot] = Some(Row::Unit(unit, ArgPack::merge_fold(packs.iter())));
        }

        slots.into_iter().flatten().collect()
    }

    fn is_merge_node(&self, unit: UnitId) -> bool {
        self.graph.unit(unit).map(|u| u.merge_node()).unwrap_or(false)
    }

    fn resolve(&mut self, row: Row) -> Result<Vec<Row>, HyperwayError> {
        match row {
            Row::Unit(unit_id, pack) => self.resolve_unit_row(unit_id, pack),
            Row::Partial(edge, pack) => {
                // Only the wire half runs here — the target
                // unit is invoked when this produced Row::Unit is itself
                // resolved, one step later.
                let mid = edge.apply_wire(&pack)?;
                Ok(vec![Row::Unit(edge.target_id(), mid)])
            }
            Row::Leaf(_, _) => Ok(Vec::new()),
        }
    }

    fn resolve_unit_row(&mut self, unit_id: UnitId, pack: ArgPack) -> Result<Vec<Row>, HyperwayError> {
        // A unit the graph built (via `add`/`chain`) is looked up there;
        // one only ever handed to `prepare` falls back to the seed
        // registry. Either way it is invoked the same way — sentinel
        // stripping and leaf policy included.
        let unit = match self.graph.unit(unit_id).or_else(|| self.seed_units.get(&unit_id)) {
            Some(unit) => unit.clone(),
            None => unreachable!(
                "Row::Unit({unit_id}) targets a unit neither the graph nor prepare() ever registered"
            ),
        };

        let result = unit.invoke(&pack)?;
        let outgoing = self.graph.outgoing(unit_id);

        if outgoing.is_empty() {
            return Ok(self.stash_if_unit_wants(unit_id, result, unit.should_stash()));
        }

        let mut next = Vec::with_capacity(outgoing.len());
        for edge in outgoing {
            next.push(Row::Partial(edge.clone(), result.clone()));
        }
        Ok(next)
    }

    /// Handles a unit with no outgoing edges: stashes `result` under
    /// `unit_id` when `should_stash` (the unit's leaf policy, ), and
    /// always reports no successor row — a `Row::Leaf` is terminal by
    /// definition and is never re-enqueued.
    fn stash_if_unit_wants(&mut self, unit_id: UnitId, result: ArgPack, should_stash: bool) -> Vec<Row> {
        if should_stash {
            self.stash.entry(unit_id).or_default().push(result);
        }
        Vec::new()
    }
}

/// Drives `stepper` to exhaustion: `prepare`, then loop `step()` until it
/// returns an empty row set or `max_steps` is reached, returning the
/// final stash.
pub fn run_to_exhaustion(
    graph: &Graph,
    start_unit: Unit,
    initial_argpack: ArgPack,
    max_steps: Option<usize>,
) -> Result<Stash, HyperwayError> {
    let mut stepper = Stepper::new(graph);
    stepper.prepare(start_unit, initial_argpack);
    run_prepared_to_exhaustion(&mut stepper, max_steps)
}

/// Same as [`run_to_exhaustion`] but operates on an already-`prepare`d
/// [`Stepper`], so callers can configure `merge_aware`/`expand` first.
pub fn run_prepared_to_exhaustion(
    stepper: &mut Stepper<'_>,
    max_steps: Option<usize>,
) -> Result<Stash, HyperwayError> {
    let mut steps_run = 0usize;
    loop {
        if let Some(max) = max_steps {
            if steps_run >= max {
                break;
            }
        }
        let produced = stepper.step()?;
        steps_run += 1;
        if produced.is_empty() {
            break;
        }
    }
    Ok(stepper.stash().clone())
}
