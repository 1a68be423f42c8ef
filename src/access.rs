//! Read and write values inside a `Value` tree by dotted key path.
//!
//! Traversal consumes one segment per level. Against a sequence the segment
//! must be a non-negative index; against a mapping it is a literal key, so
//! `"3"` is index 3 in a sequence but key `"3"` in a mapping.
//!
//! Two classes of outcome are kept apart:
//! - shape mismatches (non-numeric index, descending through a leaf) are
//!   errors and never mutate anything
//! - near misses (index past the end, key not present, absent value) are
//!   `None` / no-op under the default lenient policy
//!
//! `set` never creates intermediate containers. Each level moves the child it
//! updates out of its parent, recurses into that owned copy and writes it
//! back, whatever the outcome below.
use tracing::{debug, trace};

use crate::config::{AccessPolicy, MissingPolicy};
use crate::error::{KeyPathError, Result};
use crate::keypath::{KeyPath, Segment};
use crate::value::{Kind, Mapping, Value, element_kind};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Anything that can be addressed by a key path.
pub trait KeyPathAccess {
    fn get_path(&self, path: &KeyPath) -> Result<Option<&Value>>;

    /// `None` (or `Some(Value::Null)`) is a no-op.
    fn set_path(&mut self, value: Option<Value>, path: &KeyPath) -> Result<()>;

    /// The empty string is "no path" and resolves to `None`.
    fn value_at(&self, path: &str) -> Result<Option<&Value>> {
        match KeyPath::parse(path) {
            Some(path) => self.get_path(&path),
            None => Ok(None),
        }
    }

    /// The empty string is "no path" and does nothing.
    fn set_value_at(&mut self, path: &str, value: Option<Value>) -> Result<()> {
        match KeyPath::parse(path) {
            Some(path) => self.set_path(value, &path),
            None => Ok(()),
        }
    }
}

/// Policy-carrying accessor; the trait methods use `Accessor::default()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Accessor {
    policy: AccessPolicy,
}

#[derive(Clone, Copy)]
enum Node<'a> {
    Sequence(&'a [Value]),
    Mapping(&'a Mapping),
}

enum NodeMut<'a> {
    Sequence(&'a mut Vec<Value>),
    Mapping(&'a mut Mapping),
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Accessor {
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    pub fn get<'v>(&self, root: &'v Value, path: &KeyPath) -> Result<Option<&'v Value>> {
        let node = root_node(root, path)?;
        self.get_in(node, path.segments(), 0)
    }

    pub fn set(&self, root: &mut Value, value: Option<Value>, path: &KeyPath) -> Result<()> {
        let Some(value) = value.filter(|v| !v.is_absent()) else {
            return Ok(());
        };
        let node = match root {
            Value::Sequence(xs) => NodeMut::Sequence(xs),
            Value::Mapping(m) => NodeMut::Mapping(m),
            _ => return Err(not_a_container(path)),
        };
        self.set_in(node, value, path.segments(), 0)
    }

    pub fn get_in_sequence<'v>(&self, root: &'v [Value], path: &KeyPath) -> Result<Option<&'v Value>> {
        self.get_in(Node::Sequence(root), path.segments(), 0)
    }

    pub fn get_in_mapping<'v>(&self, root: &'v Mapping, path: &KeyPath) -> Result<Option<&'v Value>> {
        self.get_in(Node::Mapping(root), path.segments(), 0)
    }

    pub fn set_in_sequence(&self, root: &mut Vec<Value>, value: Option<Value>, path: &KeyPath) -> Result<()> {
        match value.filter(|v| !v.is_absent()) {
            Some(value) => self.set_in(NodeMut::Sequence(root), value, path.segments(), 0),
            None => Ok(()),
        }
    }

    pub fn set_in_mapping(&self, root: &mut Mapping, value: Option<Value>, path: &KeyPath) -> Result<()> {
        match value.filter(|v| !v.is_absent()) {
            Some(value) => self.set_in(NodeMut::Mapping(root), value, path.segments(), 0),
            None => Ok(()),
        }
    }

    fn get_in<'v>(&self, node: Node<'v>, segments: &[Segment], depth: usize) -> Result<Option<&'v Value>> {
        let (segment, rest) = segments.split_first().ok_or(KeyPathError::EmptyPath)?;
        trace!(segment = %segment, depth, "get");

        let child = match node {
            Node::Sequence(xs) => xs.get(index_of(segment, depth)?),
            Node::Mapping(m) => m.get(segment.as_str()),
        };
        let Some(child) = child.and_then(Value::present) else {
            return self.missing(segment, depth).map(|()| None);
        };

        if rest.is_empty() {
            return Ok(Some(child));
        }
        match child {
            Value::Sequence(xs) => self.get_in(Node::Sequence(xs), rest, depth + 1),
            Value::Mapping(m) => self.get_in(Node::Mapping(m), rest, depth + 1),
            // leaf with segments left over: stop early
            _ => Ok(Some(child)),
        }
    }

    fn set_in(&self, node: NodeMut<'_>, value: Value, segments: &[Segment], depth: usize) -> Result<()> {
        let (segment, rest) = segments.split_first().ok_or(KeyPathError::EmptyPath)?;
        trace!(segment = %segment, depth, "set");

        match node {
            NodeMut::Sequence(xs) => {
                let index = index_of(segment, depth)?;
                if index >= xs.len() {
                    return self.missing(segment, depth);
                }
                if rest.is_empty() {
                    if self.accepts(element_kind(xs.iter()), &value, segment, depth)? {
                        xs[index] = value;
                    }
                    return Ok(());
                }
                let mut child = std::mem::take(&mut xs[index]);
                let outcome = self.set_into(&mut child, value, segment, rest, depth);
                xs[index] = child;
                outcome
            }
            NodeMut::Mapping(m) => {
                let kind = element_kind(m.values());
                let Some(slot) = m.get_mut(segment.as_str()) else {
                    return self.missing(segment, depth);
                };
                if rest.is_empty() {
                    if self.accepts(kind, &value, segment, depth)? {
                        *slot = value;
                    }
                    return Ok(());
                }
                let mut child = std::mem::take(slot);
                let outcome = self.set_into(&mut child, value, segment, rest, depth);
                *slot = child;
                outcome
            }
        }
    }

    fn set_into(
        &self,
        child: &mut Value,
        value: Value,
        segment: &Segment,
        rest: &[Segment],
        depth: usize,
    ) -> Result<()> {
        match child {
            Value::Sequence(xs) => self.set_in(NodeMut::Sequence(xs), value, rest, depth + 1),
            Value::Mapping(m) => self.set_in(NodeMut::Mapping(m), value, rest, depth + 1),
            Value::Null | Value::Scalar(_) => Err(KeyPathError::MissingContainer {
                segment: segment.to_string(),
                depth,
            }),
        }
    }

    /// Narrowing check for a terminal write; only active with `kind_check`.
    ///
    /// A refused write is an error under `MissingPolicy::Strict` and a logged
    /// no-op otherwise.
    fn accepts(&self, kind: Option<Kind>, value: &Value, segment: &Segment, depth: usize) -> Result<bool> {
        let expected = match kind {
            Some(expected) if self.policy.kind_check && expected != value.kind() => expected,
            _ => return Ok(true),
        };
        match self.policy.missing {
            MissingPolicy::Lenient => {
                debug!(segment = %segment, ?expected, found = ?value.kind(), "dropping write of mismatched kind");
                Ok(false)
            }
            MissingPolicy::Strict => Err(KeyPathError::KindMismatch {
                segment: segment.to_string(),
                depth,
                expected,
                found: value.kind(),
            }),
        }
    }

    fn missing(&self, segment: &Segment, depth: usize) -> Result<()> {
        match self.policy.missing {
            MissingPolicy::Lenient => {
                debug!(segment = %segment, depth, "nothing at key path segment");
                Ok(())
            }
            MissingPolicy::Strict => Err(KeyPathError::NotFound {
                segment: segment.to_string(),
                depth,
            }),
        }
    }
}

impl KeyPathAccess for Value {
    fn get_path(&self, path: &KeyPath) -> Result<Option<&Value>> {
        Accessor::default().get(self, path)
    }

    fn set_path(&mut self, value: Option<Value>, path: &KeyPath) -> Result<()> {
        Accessor::default().set(self, value, path)
    }
}

impl KeyPathAccess for Vec<Value> {
    fn get_path(&self, path: &KeyPath) -> Result<Option<&Value>> {
        Accessor::default().get_in_sequence(self, path)
    }

    fn set_path(&mut self, value: Option<Value>, path: &KeyPath) -> Result<()> {
        Accessor::default().set_in_sequence(self, value, path)
    }
}

impl KeyPathAccess for Mapping {
    fn get_path(&self, path: &KeyPath) -> Result<Option<&Value>> {
        Accessor::default().get_in_mapping(self, path)
    }

    fn set_path(&mut self, value: Option<Value>, path: &KeyPath) -> Result<()> {
        Accessor::default().set_in_mapping(self, value, path)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn root_node<'v>(root: &'v Value, path: &KeyPath) -> Result<Node<'v>> {
    match root {
        Value::Sequence(xs) => Ok(Node::Sequence(xs)),
        Value::Mapping(m) => Ok(Node::Mapping(m)),
        _ => Err(not_a_container(path)),
    }
}

fn not_a_container(path: &KeyPath) -> KeyPathError {
    KeyPathError::NotAContainer { segment: path.first().to_string(), depth: 0 }
}

fn index_of(segment: &Segment, depth: usize) -> Result<usize> {
    segment.as_index().ok_or_else(|| KeyPathError::NonNumericIndex {
        segment: segment.to_string(),
        depth,
    })
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tree(doc: serde_json::Value) -> Value {
        Value::from(doc)
    }

    fn path(s: &str) -> KeyPath {
        KeyPath::parse(s).unwrap()
    }

    #[test]
    fn reads_through_mixed_containers() {
        let doc = tree(json!([{"subarray": [0, {"leaf": "x"}]}]));
        assert_eq!(doc.value_at("0.subarray.1.leaf").unwrap(), Some(&Value::from("x")));
    }

    #[test]
    fn single_segment_returns_container_unmodified() {
        let doc = tree(json!({"k": [1, 2]}));
        assert_eq!(doc.value_at("k").unwrap(), Some(&tree(json!([1, 2]))));
    }

    #[test]
    fn numeric_segment_is_a_key_in_mappings() {
        let doc = tree(json!({"3": "three"}));
        assert_eq!(doc.value_at("3").unwrap(), Some(&Value::from("three")));
    }

    #[test]
    fn leaf_stops_descent() {
        let doc = tree(json!({"a": 5}));
        assert_eq!(doc.value_at("a.b.c").unwrap(), Some(&Value::from(5)));
    }

    #[test]
    fn non_numeric_index_is_a_contract_violation() {
        let doc = tree(json!({"a": [1, 2]}));
        let err = doc.value_at("a.first").unwrap_err();
        assert!(matches!(err, KeyPathError::NonNumericIndex { ref segment, depth: 1 } if segment == "first"));
        assert!(err.is_contract_violation());
    }

    #[test]
    fn empty_segment_against_sequence_fails() {
        let doc = tree(json!([1]));
        assert!(matches!(doc.value_at(".0"), Err(KeyPathError::NonNumericIndex { .. })));
    }

    #[test]
    fn empty_segment_is_a_literal_mapping_key() {
        let doc = tree(json!({"": {"a": 1}}));
        assert_eq!(doc.value_at(".a").unwrap(), Some(&Value::from(1)));
    }

    #[test]
    fn empty_path_is_a_no_op() {
        let mut doc = tree(json!({"a": 1}));
        let before = doc.clone();
        assert_eq!(doc.value_at("").unwrap(), None);
        doc.set_value_at("", Some(Value::from(2))).unwrap();
        assert_eq!(doc, before);
    }

    #[test]
    fn leaf_root_is_rejected() {
        let doc = Value::from(1);
        assert!(matches!(doc.value_at("0"), Err(KeyPathError::NotAContainer { depth: 0, .. })));
    }

    #[test]
    fn deep_set_needs_existing_containers() {
        let mut doc = tree(json!({"a": {"b": null, "c": 1}}));
        let before = doc.clone();
        let err = doc.set_value_at("a.b.x", Some(Value::from(1))).unwrap_err();
        assert!(matches!(err, KeyPathError::MissingContainer { ref segment, depth: 1 } if segment == "b"));
        let err = doc.set_value_at("a.c.x", Some(Value::from(1))).unwrap_err();
        assert!(matches!(err, KeyPathError::MissingContainer { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn failed_deep_set_leaves_tree_untouched() {
        let mut doc = tree(json!({"a": [{"b": [1]}]}));
        let before = doc.clone();
        assert!(doc.set_value_at("a.0.b.zero", Some(Value::from(9))).is_err());
        assert_eq!(doc, before);
    }

    #[test]
    fn default_set_replaces_value_of_another_kind() {
        let mut doc = tree(json!({"service": {"host": "localhost", "port": "8080"}}));
        doc.set_value_at("service.port", Some(Value::from(9090))).unwrap();
        assert_eq!(doc.value_at("service.port").unwrap(), Some(&Value::from(9090)));
        assert_eq!(doc.value_at("service.host").unwrap(), Some(&Value::from("localhost")));

        let mut doc = tree(json!({"a": [{"b": 10}, {"b": 20}]}));
        doc.set_value_at("a.1.b", Some(Value::from("twenty"))).unwrap();
        assert_eq!(doc, tree(json!({"a": [{"b": 10}, {"b": "twenty"}]})));

        let mut doc = tree(json!({"nums": [1, 2, 3]}));
        doc.set_value_at("nums.0", Some(tree(json!({"one": 1})))).unwrap();
        assert_eq!(doc, tree(json!({"nums": [{"one": 1}, 2, 3]})));
    }

    #[test]
    fn opt_in_kind_check_drops_mismatched_write() {
        let accessor = Accessor::new(AccessPolicy::default().with_kind_check(true));
        let mut doc = tree(json!({"nums": [1, 2, 3]}));
        accessor.set(&mut doc, Some(Value::from("one")), &path("nums.0")).unwrap();
        assert_eq!(doc, tree(json!({"nums": [1, 2, 3]})));

        accessor.set(&mut doc, Some(Value::from(10)), &path("nums.0")).unwrap();
        assert_eq!(doc, tree(json!({"nums": [10, 2, 3]})));
    }

    #[test]
    fn strict_kind_check_reports_mismatched_write() {
        let accessor = Accessor::new(AccessPolicy::strict().with_kind_check(true));
        let mut doc = tree(json!({"port": "8080"}));
        let err = accessor.set(&mut doc, Some(Value::from(9090)), &path("port")).unwrap_err();
        assert!(matches!(
            err,
            KeyPathError::KindMismatch { expected: Kind::String, found: Kind::Number, depth: 0, .. }
        ));
        assert_eq!(doc, tree(json!({"port": "8080"})));
    }

    #[test]
    fn heterogeneous_container_accepts_any_kind() {
        let mut doc = tree(json!([1, "two", null]));
        doc.set_value_at("2", Some(tree(json!({"three": 3})))).unwrap();
        assert_eq!(doc, tree(json!([1, "two", {"three": 3}])));
    }

    #[test]
    fn single_child_container_accepts_any_kind() {
        let mut doc = tree(json!([1]));
        doc.set_value_at("0", Some(Value::from("x"))).unwrap();
        assert_eq!(doc, tree(json!(["x"])));
    }

    #[test]
    fn absent_value_write_is_a_no_op() {
        let mut doc = tree(json!({"a": 1}));
        doc.set_value_at("a", None).unwrap();
        doc.set_value_at("a", Some(Value::Null)).unwrap();
        assert_eq!(doc, tree(json!({"a": 1})));
    }

    #[test]
    fn absent_mapping_key_is_not_inserted() {
        let mut doc = tree(json!({"a": 1}));
        doc.set_value_at("b", Some(Value::from(2))).unwrap();
        assert_eq!(doc, tree(json!({"a": 1})));
    }

    #[test]
    fn strict_policy_reports_near_misses() {
        let accessor = Accessor::new(AccessPolicy::strict());
        let mut doc = tree(json!({"a": [1, null]}));

        let err = accessor.get(&doc, &path("a.5")).unwrap_err();
        assert!(matches!(err, KeyPathError::NotFound { ref segment, depth: 1 } if segment == "5"));
        assert!(!err.is_contract_violation());
        assert!(matches!(accessor.get(&doc, &path("a.1")), Err(KeyPathError::NotFound { .. })));
        assert!(matches!(accessor.get(&doc, &path("z")), Err(KeyPathError::NotFound { .. })));
        assert!(matches!(
            accessor.set(&mut doc, Some(Value::from(1)), &path("a.9")),
            Err(KeyPathError::NotFound { .. })
        ));
        assert_eq!(accessor.get(&doc, &path("a.0")).unwrap(), Some(&Value::from(1)));
    }

    #[test]
    fn plain_vec_and_mapping_roots() {
        let mut xs: Vec<Value> = vec![Value::from(1), tree(json!({"k": "v"}))];
        assert_eq!(xs.value_at("1.k").unwrap(), Some(&Value::from("v")));
        xs.set_value_at("1.k", Some(Value::from("w"))).unwrap();
        assert_eq!(xs.value_at("1.k").unwrap(), Some(&Value::from("w")));

        let mut map = Mapping::new();
        map.insert("list".into(), tree(json!([true, false])));
        map.set_value_at("list.1", Some(Value::from(true))).unwrap();
        assert_eq!(map.value_at("list").unwrap(), Some(&tree(json!([true, true]))));
    }
}
