//! # hyperway — a small functional execution engine over a directed graph
//!
//! Hyperway walks a directed graph whose vertices ([`Unit`](unit::Unit))
//! wrap arbitrary host callables and whose edges ([`Edge`](edge::Edge))
//! may carry an optional in-transit transform (a "wire"). A driver (the
//! [`Stepper`](stepper::Stepper)) walks the graph one half-edge at a
//! time, producing a concurrent set of pending continuations per step,
//! fanning out at branch points, optionally merging at marked vertices,
//! and stashing terminal results when a vertex has no outgoing edges.
//!
//! ## Core concepts
//!
//! - [`ArgPack`](argpack::ArgPack) — the carrier of one call's positional
//!   and keyword arguments between units, wires, and the stash.
//! - [`Unit`](unit::Unit) — an identity-bearing wrapper around a user
//!   callable, with an optional sentinel-stripping policy and an optional
//!   merge flag.
//! - [`Edge`](edge::Edge) — binds a source unit to a target unit through
//!   an optional wire, and exposes the two-phase `invoke_a` / `transfer`
//!   / `pluck` operations.
//! - [`Graph`](graph::Graph) — the append-only, identity-keyed multimap of
//!   outgoing edges built up by [`Graph::add`](graph::Graph::add) and
//!   [`Graph::chain`](graph::Graph::chain).
//! - [`Stepper`](stepper::Stepper) — the cooperative, single-threaded
//!   driver: [`Stepper::prepare`](stepper::Stepper::prepare) seeds one
//!   row, [`Stepper::step`](stepper::Stepper::step) advances one round,
//!   and [`stepper::run_to_exhaustion`] loops to completion.
//!
//! ## What this crate deliberately does not do
//!
//! Persist graph state, schedule across OS threads, detect or prevent
//! infinite loops, type-check user callables, or interpret the graph
//! under any operator-precedence algebra. Execution is strictly
//! left-associative / as-encountered, and a cyclic graph will run
//! forever unless the caller imposes a step bound.
//!
//! ## Example
//!
//! ```rust
//! use hyperway::argpack::{ArgPack, Returned};
//! use hyperway::graph::Graph;
//! use hyperway::unit::Unit;
//! use hyperway::stepper::run_to_exhaustion;
//! use serde_json::json;
//!
//! fn add(n: i64) -> Unit {
//!     Unit::new(move |pos, _kw| {
//!         let v = pos.first().and_then(|v| v.as_i64()).unwrap_or(0);
//!         Ok(Returned::Value(json!(v + n)))
//!     })
//! }
//!
//! let mut graph = Graph::new();
//! let a = add(10);
//! let b = add(20);
//! let c = add(30);
//! graph.chain([a.clone(), b, c.clone()]);
//!
//! let stash = run_to_exhaustion(&graph, a.clone(), ArgPack::single(json!(10)), None).unwrap();
//! assert_eq!(stash.get(&c.id()).unwrap()[0].pos(), &[json!(70)]);
//! ```

pub mod argpack;
pub mod edge;
pub mod error;
pub mod expand;
pub mod graph;
pub mod row;
pub mod stepper;
pub mod unit;

pub use argpack::ArgPack;
pub use edge::Edge;
pub use error::{HyperwayError, Result};
pub use graph::Graph;
pub use row::Row;
pub use stepper::Stepper;
pub use unit::Unit;
