//! The single value carrier that flows between [`Unit`](crate::unit::Unit)s,
//! [`Edge`](crate::edge::Edge) wires, and the [`Stash`](crate::stepper::Stash).
//!
//! An `ArgPack` is an ordered tuple of positional values plus a mapping of
//! keyword values — the engine's analogue of `f(*args, **kwargs)`. It is
//! immutable from the point of view of the engine: once built, nothing in
//! this crate mutates a pack in place, it only produces new ones.

use std::collections::BTreeMap;

/// A value carried through the graph. Kept as `serde_json::Value` rather
/// than a bespoke enum: user callables are heterogeneous and the engine
/// never inspects the value itself, only whether a positional equals the
/// configured sentinel, so a dynamically-typed, cheaply-cloned value
/// is the right fit.
pub type Value = serde_json::Value;

/// What a user callable or wire handed back, before it has been through
/// [`ArgPack::wrap`]. Exists so the idempotent-wrapping rule — "a
/// pack wraps to itself, anything else becomes a sole positional" — has a
/// real static distinction to dispatch on instead of guessing at runtime.
#[derive(Debug, Clone)]
pub enum Returned {
    /// A plain value, to become the sole positional of a fresh pack.
    Value(Value),
    /// An already-built pack, returned unchanged by `wrap`.
    Pack(ArgPack),
}

impl From<Value> for Returned {
    fn from(v: Value) -> Self {
        Returned::Value(v)
    }
}

impl From<ArgPack> for Returned {
    fn from(p: ArgPack) -> Self {
        Returned::Pack(p)
    }
}

/// Ordered positional arguments plus a keyword mapping for one call.
///
/// # Idempotent wrapping
///
/// [`ArgPack::wrap`] is the sole construction rule used everywhere a
/// callable's return value needs to become a pack: wrapping an existing
/// `ArgPack` returns it unchanged, wrapping anything else produces a pack
/// with that value as its sole positional argument. This is enforced at
/// the constructor, not left to callers to get right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArgPack {
    pos: Vec<Value>,
    kw: BTreeMap<String, Value>,
}

impl ArgPack {
    /// Builds a pack directly from a positional tuple and keyword map.
    pub fn new(pos: Vec<Value>, kw: BTreeMap<String, Value>) -> Self {
        ArgPack { pos, kw }
    }

    /// A pack with a single positional value and no keywords.
    pub fn single(value: Value) -> Self {
        ArgPack { pos: vec![value], kw: BTreeMap::new() }
    }

    /// An empty pack: no positionals, no keywords.
    pub fn empty() -> Self {
        ArgPack::default()
    }

    pub fn pos(&self) -> &[Value] {
        &self.pos
    }

    pub fn kw(&self) -> &BTreeMap<String, Value> {
        &self.kw
    }

    pub fn into_parts(self) -> (Vec<Value>, BTreeMap<String, Value>) {
        (self.pos, self.kw)
    }

    /// Returns `true` when this pack's sole positional equals `sentinel`
    /// and there are no other positionals. Keyword arguments
    /// never participate in sentinel matching.
    pub fn is_sole_positional(&self, sentinel: &Value) -> bool {
        self.pos.len() == 1 && &self.pos[0] == sentinel
    }

    /// Wraps `returned` into an `ArgPack` per the idempotent rule: a
    /// pack comes back unchanged, anything else becomes the sole
    /// positional of a fresh pack.
    pub fn wrap(returned: impl Into<Returned>) -> ArgPack {
        match returned.into() {
            Returned::Pack(pack) => pack,
            Returned::Value(value) => ArgPack::single(value),
        }
    }

    /// Folds several packs arriving at a merge-marked unit in one step into
    /// a single pack: positional tuples concatenate in
    /// arrival order, keyword maps merge last-write-wins in arrival order.
    pub fn merge_fold<'a, I: IntoIterator<Item = &'a ArgPack>>(packs: I) -> ArgPack {
        let mut pos = Vec::new();
        let mut kw = BTreeMap::new();
        for pack in packs {
            pos.extend(pack.pos.iter().cloned());
            for (k, v) in &pack.kw {
                kw.insert(k.clone(), v.clone());
            }
        }
        ArgPack::new(pos, kw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wrap_of_pack_is_identity() {
        let pack = ArgPack::single(json!(42));
        let wrapped = ArgPack::wrap(pack.clone());
        assert_eq!(pack, wrapped);
    }

    #[test]
    fn wrap_twice_is_idempotent() {
        let once = ArgPack::wrap(json!(42));
        let twice = ArgPack::wrap(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn wrap_non_pack_becomes_sole_positional() {
        let pack = ArgPack::wrap(json!(10));
        assert_eq!(pack.pos(), &[json!(10)]);
        assert!(pack.kw().is_empty());
    }

    #[test]
    fn merge_fold_concatenates_positionals_in_order() {
        let a = ArgPack::single(json!(4));
        let b = ArgPack::single(json!(5));
        let folded = ArgPack::merge_fold([&a, &b]);
        assert_eq!(folded.pos(), &[json!(4), json!(5)]);
    }

    #[test]
    fn merge_fold_keywords_last_write_wins() {
        let mut a_kw = BTreeMap::new();
        a_kw.insert("x".to_string(), json!(1));
        let a = ArgPack::new(vec![], a_kw);
        let mut b_kw = BTreeMap::new();
        b_kw.insert("x".to_string(), json!(2));
        let b = ArgPack::new(vec![], b_kw);
        let folded = ArgPack::merge_fold([&a, &b]);
        assert_eq!(folded.kw().get("x"), Some(&json!(2)));
    }

    #[test]
    fn sole_positional_sentinel_match() {
        let pack = ArgPack::single(Value::Null);
        assert!(pack.is_sole_positional(&Value::Null));
        let pack_with_kw = ArgPack::new(vec![Value::Null], {
            let mut kw = BTreeMap::new();
            kw.insert("k".to_string(), json!(1));
            kw
        });
        assert!(pack_with_kw.is_sole_positional(&Value::Null));
    }
}
