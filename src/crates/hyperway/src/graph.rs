//! [`Graph`] — the append-only, identity-keyed multimap of outgoing edges.

use crate::edge::{Edge, Wire};
use crate::unit::{Unit, UnitId};
use std::collections::BTreeMap;
use std::collections::HashMap;

/// Converts a value into a [`Unit`]: a raw callable is wrapped into a
/// brand-new `Unit` (fresh id), while an existing `Unit` is reused as-is
/// (same id). Implemented as a trait rather than an enum so
/// [`Graph::add`]/[`Graph::chain`] read naturally with either a bare
/// closure or a unit already built.
pub trait IntoUnit {
    fn into_unit(self) -> Unit;
}

impl IntoUnit for Unit {
    fn into_unit(self) -> Unit {
        self
    }
}

impl<F> IntoUnit for F
where
    F: Fn(&[crate::argpack::Value], &BTreeMap<String, crate::argpack::Value>) -> crate::unit::CallableResult
        + Send
        + Sync
        + 'static,
{
    fn into_unit(self) -> Unit {
        Unit::new(self)
    }
}

/// Identity-keyed multimap of outgoing edges per [`Unit`], built up by
/// append-only calls to [`Graph::add`]/[`Graph::chain`]. No deletion or
/// mutation operation is specified — the builder surface only grows.
#[derive(Default, Clone)]
pub struct Graph {
    units: HashMap<UnitId, Unit>,
    outgoing: HashMap<UnitId, Vec<Edge>>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    fn remember(&mut self, unit: &Unit) {
        self.units.entry(unit.id()).or_insert_with(|| unit.clone());
        self.outgoing.entry(unit.id()).or_default();
    }

    /// Wraps `a` and `b` to units if needed, creates a new edge between
    /// them, and appends it to `a`'s outgoing list. Edges are never
    /// deduplicated — adding the same pair twice produces two parallel
    /// edges that each execute independently.
    pub fn add(&mut self, a: impl IntoUnit, b: impl IntoUnit, wire: Option<Wire>, name: Option<String>) -> Edge {
        let a = a.into_unit();
        let b = b.into_unit();
        self.remember(&a);
        self.remember(&b);
        let edge = Edge::new(a.clone(), b, wire, name);
        self.outgoing.get_mut(&a.id()).expect("just remembered").push(edge.clone());
        edge
    }

    /// Successively `add(u1, u2), add(u2, u3), ...`, returning the edges
    /// produced in order. Accepts the same kind of input as `add` — a
    /// bare callable or an already-built `Unit` for each position, not
    /// just `Unit`s — and converts each one exactly once, so a three-item
    /// chain yields three units, not five: each intermediate unit is
    /// reused as both the incoming and outgoing endpoint.
    pub fn chain(&mut self, units: impl IntoIterator<Item = impl IntoUnit>) -> Vec<Edge> {
        let units: Vec<Unit> = units.into_iter().map(IntoUnit::into_unit).collect();
        let mut edges = Vec::with_capacity(units.len().saturating_sub(1));
        for pair in units.windows(2) {
            edges.push(self.add(pair[0].clone(), pair[1].clone(), None, None));
        }
        edges
    }

    /// Outgoing edges from `unit`, in insertion order. Empty (not an
    /// error) for a unit the graph has never seen.
    pub fn outgoing(&self, unit: UnitId) -> &[Edge] {
        self.outgoing.get(&unit).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Looks up a unit previously added to this graph by id. Used by the
    /// [`Stepper`](crate::stepper::Stepper) to resolve a `Row::Unit`
    /// before invoking it.
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    /// All units known to this graph, read-only — the surface a
    /// visualization layer built on top of this crate would consume.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    /// All edges known to this graph, read-only, grouped by source.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.outgoing.values().flatten()
    }
}

/// Convenience for building a [`Unit`] directly from a plain Rust
/// closure without going through [`Graph::add`].
pub fn as_unit<F>(callable: F) -> Unit
where
    F: Fn(&[crate::argpack::Value], &BTreeMap<String, crate::argpack::Value>) -> crate::unit::CallableResult
        + Send
        + Sync
        + 'static,
{
    Unit::new(callable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::argpack::Returned;
    use serde_json::json;

    fn add(n: i64) -> Unit {
        Unit::new(move |pos, _kw| {
            let v = pos.first().and_then(|v| v.as_i64()).unwrap_or(0);
            Ok(Returned::Value(json!(v + n)))
        })
    }

    #[test]
    fn add_wraps_raw_callables_into_fresh_units() {
        let mut graph = Graph::new();
        let edge = graph.add(
            |pos: &[crate::argpack::Value], _kw: &BTreeMap<String, crate::argpack::Value>| {
                Ok(Returned::Value(pos.first().cloned().unwrap_or(crate::argpack::Value::Null)))
            },
            |pos: &[crate::argpack::Value], _kw: &BTreeMap<String, crate::argpack::Value>| {
                Ok(Returned::Value(pos.first().cloned().unwrap_or(crate::argpack::Value::Null)))
            },
            None,
            None,
        );
        assert_ne!(edge.source_id(), edge.target_id());
    }

    #[test]
    fn add_reuses_existing_unit_identity() {
        let mut graph = Graph::new();
        let shared = add(1);
        let e1 = graph.add(shared.clone(), add(2), None, None);
        let e2 = graph.add(add(3), shared.clone(), None, None);
        assert_eq!(e1.source_id(), shared.id());
        assert_eq!(e2.target_id(), shared.id());
    }

    #[test]
    fn parallel_edges_are_not_deduplicated() {
        let mut graph = Graph::new();
        let a = add(1);
        let b = add(2);
        graph.add(a.clone(), b.clone(), None, None);
        graph.add(a.clone(), b.clone(), None, None);
        assert_eq!(graph.outgoing(a.id()).len(), 2);
    }

    #[test]
    fn chain_reuses_intermediate_units() {
        let mut graph = Graph::new();
        let u1 = add(10);
        let u2 = add(20);
        let u3 = add(30);
        let edges = graph.chain([u1.clone(), u2.clone(), u3.clone()]);
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].target_id(), u2.id());
        assert_eq!(edges[1].source_id(), u2.id());
        // Exactly three distinct units known to the graph, not five.
        assert_eq!(graph.units().count(), 3);
    }

    #[test]
    fn chain_accepts_raw_callables_like_add_does() {
        let mut graph = Graph::new();
        // A zero-capture closure is `Copy`, so the same value can fill
        // every array slot while each `chain`-internal `into_unit()` call
        // still allocates its own fresh `Unit`.
        let identity = |pos: &[crate::argpack::Value], _kw: &BTreeMap<String, crate::argpack::Value>| {
            Ok(Returned::Value(pos.first().cloned().unwrap_or(crate::argpack::Value::Null)))
        };
        let edges = graph.chain([identity, identity, identity]);
        assert_eq!(edges.len(), 2);
        assert_eq!(graph.units().count(), 3);
    }

    #[test]
    fn outgoing_order_matches_insertion_order() {
        let mut graph = Graph::new();
        let source = add(0);
        let t1 = add(1);
        let t2 = add(2);
        graph.add(source.clone(), t1.clone(), None, None);
        graph.add(source.clone(), t2.clone(), None, None);
        let out = graph.outgoing(source.id());
        assert_eq!(out[0].target_id(), t1.id());
        assert_eq!(out[1].target_id(), t2.id());
    }

    #[test]
    fn unit_with_no_outgoing_edges_has_empty_slice() {
        let graph = Graph::new();
        let stray = add(0);
        assert!(graph.outgoing(stray.id()).is_empty());
    }
}
