//! [`Edge`] — the two-phase source → wire → target connection.

use crate::argpack::ArgPack;
use crate::error::{BoxError, HyperwayError};
use crate::unit::{Unit, UnitId};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque identity for an [`Edge`]. Parallel edges between the same pair
/// of units are never deduplicated and each gets its own id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(Uuid);

impl EdgeId {
    fn fresh() -> Self {
        EdgeId(Uuid::new_v4())
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge:{}", self.0)
    }
}

pub type WireResult = std::result::Result<ArgPack, BoxError>;

/// A pure function from `ArgPack` to `ArgPack` applied mid-edge.
/// Must return an `ArgPack`; any other outcome is a [`HyperwayError::WireContractViolation`].
pub type Wire = Arc<dyn Fn(&ArgPack) -> WireResult + Send + Sync>;

/// Binds a source [`Unit`] to a target `Unit` through an optional [`Wire`].
///
/// An edge is self-contained: it owns clones of its source and target
/// units (cheap — a `Unit` is an id plus an `Arc`-backed callable) rather
/// than indices into a graph, which is what makes [`Edge::pluck`] usable
/// without a [`Graph`](crate::graph::Graph) at all.
#[derive(Clone)]
pub struct Edge {
    id: EdgeId,
    a: Unit,
    b: Unit,
    wire: Option<Wire>,
    name: Option<String>,
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Edge")
            .field("id", &self.id)
            .field("a", &self.a.id())
            .field("b", &self.b.id())
            .field("wire", &self.wire.as_ref().map(|_| "<fn>"))
            .field("name", &self.name)
            .finish()
    }
}

impl Edge {
    pub fn new(a: Unit, b: Unit, wire: Option<Wire>, name: Option<String>) -> Self {
        Edge { id: EdgeId::fresh(), a, b, wire, name }
    }

    pub fn id(&self) -> EdgeId {
        self.id
    }

    pub fn source(&self) -> &Unit {
        &self.a
    }

    pub fn target(&self) -> &Unit {
        &self.b
    }

    pub fn source_id(&self) -> UnitId {
        self.a.id()
    }

    pub fn target_id(&self) -> UnitId {
        self.b.id()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invokes the source unit with `args` and returns the resulting pack:
    /// the ordinary "call the left side" half of an edge.
    pub fn invoke_a(&self, args: &ArgPack) -> Result<ArgPack, HyperwayError> {
        self.a.invoke(args)
    }

    /// Applies just the wire half of this edge — or passes `argpack`
    /// through unchanged when there is no wire — without invoking the
    /// target unit.
    ///
    /// This is the half [`Stepper::step`](crate::stepper::Stepper::step)
    /// calls when resolving a `Row::Partial`: the target's invocation is
    /// deferred to when the `Row::Unit` this produces is itself resolved,
    /// in the *next* step, which is what keeps every edge a schedulable
    /// breakpoint.
    pub fn apply_wire(&self, argpack: &ArgPack) -> Result<ArgPack, HyperwayError> {
        match &self.wire {
            Some(wire) => wire(argpack).map_err(|reason| HyperwayError::WireContractViolation {
                edge: self.id,
                reason: reason.to_string(),
            }),
            None => Ok(argpack.clone()),
        }
    }

    /// Applies the wire (if present) to `argpack`, then invokes the
    /// target unit with the wire's output — or with `argpack` directly
    /// when there is no wire. Unlike [`Edge::apply_wire`] alone,
    /// this runs both halves back to back; it is what [`Edge::pluck`]
    /// composes with [`Edge::invoke_a`] for graph-less, driver-less edge
    /// execution, and is not how the `Stepper` resolves a `Row::Partial`
    /// (see `apply_wire`).
    pub fn transfer(&self, argpack: &ArgPack) -> Result<ArgPack, HyperwayError> {
        let mid = self.apply_wire(argpack)?;
        self.b.invoke(&mid)
    }

    /// `transfer(invoke_a(args))` — the composition that executes both
    /// halves of an edge end-to-end outside any driver.
    pub fn pluck(&self, args: &ArgPack) -> Result<ArgPack, HyperwayError> {
        self.transfer(&self.invoke_a(args)?)
    }
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

    fn doubler() -> Wire {
        Arc::new(|pack: &ArgPack| {
            let v = pack.pos().first().and_then(|v| v.as_i64()).unwrap_or(0);
            Ok(ArgPack::single(json!(v * 2)))
        })
    }

    #[test]
    fn pluck_equals_transfer_of_invoke_a() {
        let edge = Edge::new(add(1), add(2), Some(doubler()), None);
        let input = ArgPack::single(json!(1));
        let via_pluck = edge.pluck(&input).unwrap();
        let via_two_phase = edge.transfer(&edge.invoke_a(&input).unwrap()).unwrap();
        assert_eq!(via_pluck, via_two_phase);
    }

    #[test]
    fn pluck_applies_wire_between_source_and_target() {
        // add_1 -> doubler -> add_2
        let edge = Edge::new(add(1), add(2), Some(doubler()), None);
        let result = edge.pluck(&ArgPack::single(json!(1))).unwrap();
        assert_eq!(result.pos(), &[json!(6)]);
        let result = edge.pluck(&ArgPack::single(json!(10))).unwrap();
        assert_eq!(result.pos(), &[json!(24)]);
    }

    #[test]
    fn no_wire_passes_pack_through_unchanged() {
        let edge = Edge::new(add(1), add(2), None, None);
        let result = edge.pluck(&ArgPack::single(json!(0))).unwrap();
        assert_eq!(result.pos(), &[json!(3)]);
    }

    #[test]
    fn wire_contract_violation_surfaces_distinctly() {
        let bad_wire: Wire = Arc::new(|_pack| Err(Box::<dyn std::error::Error + Send + Sync>::from("not a pack")));
        let edge = Edge::new(add(1), add(2), Some(bad_wire), None);
        let err = edge.transfer(&ArgPack::single(json!(1))).unwrap_err();
        assert!(matches!(err, HyperwayError::WireContractViolation { .. }));
    }

    #[test]
    fn self_loop_edge_is_permitted() {
        let unit = add(2);
        let edge = Edge::new(unit.clone(), unit, None, None);
        assert_eq!(edge.source_id(), edge.target_id());
        let result = edge.pluck(&ArgPack::single(json!(1))).unwrap();
        assert_eq!(result.pos(), &[json!(3)]);
    }
}
