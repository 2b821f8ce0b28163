//! [`Unit`] — the identity-bearing wrapper around a user callable.

use crate::argpack::{ArgPack, Returned, Value};
use crate::error::{BoxError, HyperwayError};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque, stable identity for a [`Unit`]. Two units built from the same
/// raw callable via separate [`Unit::new`] calls compare unequal; cloning
/// or re-wrapping an existing `Unit` preserves its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(Uuid);

impl UnitId {
    fn fresh() -> Self {
        UnitId(Uuid::new_v4())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit:{}", self.0)
    }
}

/// Result type returned by a user callable.
pub type CallableResult = std::result::Result<Returned, BoxError>;

/// A user-supplied function taking positional and keyword values and
/// returning anything that can become an [`ArgPack`].
pub type Callable = Arc<dyn Fn(&[Value], &BTreeMap<String, Value>) -> CallableResult + Send + Sync>;

/// What a [`Unit`] with no outgoing edges does with the pack it produced.
/// The default stashes; `Suppress` computes the result and drops it,
/// modeled here as a configuration flag rather than a second unit type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeafPolicy {
    #[default]
    Stash,
    Suppress,
}

/// Identity-bearing wrapper around a user callable `f`.
///
/// Constructing a `Unit` from a raw callable (via [`Unit::new`] or
/// [`Unit::raw`]) always allocates a fresh [`UnitId`]; `Unit` is `Clone`
/// so re-using an existing unit's identity is simply cloning the value,
/// which copies the id along with it.
#[derive(Clone)]
pub struct Unit {
    id: UnitId,
    callable: Callable,
    sentinel: Option<Value>,
    merge_node: bool,
    leaf_policy: LeafPolicy,
    /// Set by [`Unit::raw`]: bypasses sentinel stripping entirely and
    /// passes positional/keyword arguments through unchanged.
    bypass_sentinel: bool,
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unit")
            .field("id", &self.id)
            .field("sentinel", &self.sentinel)
            .field("merge_node", &self.merge_node)
            .field("leaf_policy", &self.leaf_policy)
            .field("bypass_sentinel", &self.bypass_sentinel)
            .finish_non_exhaustive()
    }
}

impl Unit {
    /// Wraps `callable` in a fresh `Unit` with no sentinel, no merge
    /// flag, and the default (stashing) leaf policy.
    pub fn new<F>(callable: F) -> Self
    where
        F: Fn(&[Value], &BTreeMap<String, Value>) -> CallableResult + Send + Sync + 'static,
    {
        Unit {
            id: UnitId::fresh(),
            callable: Arc::new(callable),
            sentinel: None,
            merge_node: false,
            leaf_policy: LeafPolicy::default(),
            bypass_sentinel: false,
        }
    }

    /// Wraps `callable` in a fresh `Unit` that bypasses sentinel
    /// stripping entirely, regardless of `with_sentinel`.
    pub fn raw<F>(callable: F) -> Self
    where
        F: Fn(&[Value], &BTreeMap<String, Value>) -> CallableResult + Send + Sync + 'static,
    {
        let mut unit = Unit::new(callable);
        unit.bypass_sentinel = true;
        unit
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    /// Returns a copy of this unit configured with `sentinel`.
    pub fn with_sentinel(mut self, sentinel: Value) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    /// Returns a copy of this unit flagged as a merge node.
    pub fn with_merge_node(mut self, merge_node: bool) -> Self {
        self.merge_node = merge_node;
        self
    }

    /// Returns a copy of this unit with the given leaf policy.
    pub fn with_leaf_policy(mut self, policy: LeafPolicy) -> Self {
        self.leaf_policy = policy;
        self
    }

    pub fn merge_node(&self) -> bool {
        self.merge_node
    }

    pub fn leaf_policy(&self) -> LeafPolicy {
        self.leaf_policy
    }

    pub fn sentinel(&self) -> Option<&Value> {
        self.sentinel.as_ref()
    }

    /// Invokes the wrapped callable on `argpack`, applying sentinel
    /// stripping first:
    ///
    /// 1. Split `argpack` into positional and keyword parts.
    /// 2. If a sentinel is configured (and this isn't a raw unit) and the
    ///    positional tuple is exactly `[sentinel]`, drop it before the call.
    /// 3. Call `f(*positional, **keyword)` and wrap the result.
    #[tracing::instrument(level = "trace", skip(self, argpack), fields(unit = %self.id))]
    pub fn invoke(&self, argpack: &ArgPack) -> std::result::Result<ArgPack, HyperwayError> {
        let stripped;
        let positional: &[Value] = if !self.bypass_sentinel {
            match &self.sentinel {
                Some(sentinel) if argpack.is_sole_positional(sentinel) => {
                    stripped = Vec::new();
                    &stripped
                }
                _ => argpack.pos(),
            }
        } else {
            argpack.pos()
        };

        let result = (self.callable)(positional, argpack.kw()).map_err(|source| {
            HyperwayError::CallableFailure { unit: self.id, source }
        })?;
        Ok(ArgPack::wrap(result))
    }

    /// Invoked by the [`Stepper`](crate::stepper::Stepper) when this unit
    /// has no outgoing edges. The default policy stashes `argpack` under
    /// this unit's id; `LeafPolicy::Suppress` drops it silently and it is
    /// never recorded.
    pub fn should_stash(&self) -> bool {
        matches!(self.leaf_policy, LeafPolicy::Stash)
    }
}
