//! Tree diff: compare two values and record every differing path.
//!
//! Maps are walked in sorted key order and sequences by index, so the same
//! pair of inputs always yields the same change list.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// One step of a path into a value.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// What happened at a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present only on the right.
    Insert,
    /// Present on both sides with different values.
    Update,
    /// Present only on the left.
    Delete,
}

impl ChangeKind {
    /// Past-tense verb used in change descriptions.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Insert => "added",
            Self::Update => "updated",
            Self::Delete => "removed",
        }
    }
}

/// A single difference between two values.
#[derive(Clone, Debug, PartialEq)]
pub struct Change {
    pub path: Vec<PathSegment>,
    pub kind: ChangeKind,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl Change {
    /// Dot-joined path, e.g. `formatConfig.headerRow`.
    pub fn path_string(&self) -> String {
        self.path
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Weight of the changed content: the inserted or deleted value, or the
    /// heavier side of an update.
    pub fn weight(&self) -> usize {
        let old = self.old.as_ref().map_or(0, weight);
        let new = self.new.as_ref().map_or(0, weight);
        match self.kind {
            ChangeKind::Insert => new,
            ChangeKind::Delete => old,
            ChangeKind::Update => old.max(new),
        }
    }
}

/// Size statistics for both sides of a comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffStat {
    pub left_nodes: usize,
    pub right_nodes: usize,
    /// Cumulative weight of the left value.
    pub left_weight: usize,
    /// Cumulative weight of the right value.
    pub right_weight: usize,
    pub inserts: usize,
    pub updates: usize,
    pub deletes: usize,
}

/// Ordered changes between two values plus their statistics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChangeSet {
    pub changes: Vec<Change>,
    pub stat: DiffStat,
}

impl ChangeSet {
    /// Returns `true` if the two sides are equal.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Sum of the weights of every change.
    pub fn changed_weight(&self) -> usize {
        self.changes.iter().map(Change::weight).sum()
    }
}

/// Diff two values.
pub fn diff(left: &Value, right: &Value) -> ChangeSet {
    let mut changes = Vec::new();
    let mut path = Vec::new();
    walk(left, right, &mut path, &mut changes);

    let count = |kind| changes.iter().filter(|c: &&Change| c.kind == kind).count();
    let stat = DiffStat {
        left_nodes: node_count(left),
        right_nodes: node_count(right),
        left_weight: cumulative_weight(left),
        right_weight: cumulative_weight(right),
        inserts: count(ChangeKind::Insert),
        updates: count(ChangeKind::Update),
        deletes: count(ChangeKind::Delete),
    };
    ChangeSet { changes, stat }
}

fn walk(left: &Value, right: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Change>) {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            let mut keys: Vec<&String> = l.keys().chain(r.keys()).collect();
            keys.sort();
            keys.dedup();
            for key in keys {
                path.push(PathSegment::Key(key.clone()));
                match (l.get(key), r.get(key)) {
                    (Some(a), Some(b)) => walk(a, b, path, out),
                    (Some(a), None) => out.push(removed(path, a)),
                    (None, Some(b)) => out.push(added(path, b)),
                    (None, None) => {}
                }
                path.pop();
            }
        }
        (Value::Array(l), Value::Array(r)) => {
            for i in 0..l.len().max(r.len()) {
                path.push(PathSegment::Index(i));
                match (l.get(i), r.get(i)) {
                    (Some(a), Some(b)) => walk(a, b, path, out),
                    (Some(a), None) => out.push(removed(path, a)),
                    (None, Some(b)) => out.push(added(path, b)),
                    (None, None) => {}
                }
                path.pop();
            }
        }
        (a, b) if a != b => out.push(Change {
            path: path.clone(),
            kind: ChangeKind::Update,
            old: Some(a.clone()),
            new: Some(b.clone()),
        }),
        _ => {}
    }
}

fn added(path: &[PathSegment], value: &Value) -> Change {
    Change {
        path: path.to_vec(),
        kind: ChangeKind::Insert,
        old: None,
        new: Some(value.clone()),
    }
}

fn removed(path: &[PathSegment], value: &Value) -> Change {
    Change {
        path: path.to_vec(),
        kind: ChangeKind::Delete,
        old: Some(value.clone()),
        new: None,
    }
}

fn scalar_weight(value: &Value) -> usize {
    match value {
        Value::String(s) => s.len(),
        Value::Bool(true) => 4,
        Value::Bool(false) => 5,
        Value::Null => 4,
        Value::Number(n) => n.to_string().len(),
        Value::Array(_) | Value::Object(_) => 1,
    }
}

/// Weight of a value: text length for scalars, one plus the children for
/// containers.
pub fn weight(value: &Value) -> usize {
    let mut total = 0;
    let mut stack = vec![value];
    while let Some(node) = stack.pop() {
        match node {
            Value::Array(items) => {
                total += 1;
                stack.extend(items);
            }
            Value::Object(map) => {
                total += 1;
                stack.extend(map.values());
            }
            scalar => total += scalar_weight(scalar),
        }
    }
    total
}

/// Sum of [`weight`] over every node of the tree. Content nested `n` levels
/// deep is counted `n + 1` times.
pub fn cumulative_weight(value: &Value) -> usize {
    let mut total = 0;
    let mut stack = vec![(value, 1usize)];
    while let Some((node, levels)) = stack.pop() {
        match node {
            Value::Array(items) => {
                total += levels;
                stack.extend(items.iter().map(|child| (child, levels + 1)));
            }
            Value::Object(map) => {
                total += levels;
                stack.extend(map.values().map(|child| (child, levels + 1)));
            }
            scalar => total += levels * scalar_weight(scalar),
        }
    }
    total
}

/// Number of values in the tree, containers included.
pub fn node_count(value: &Value) -> usize {
    let mut count = 0;
    let mut stack = vec![value];
    while let Some(node) = stack.pop() {
        count += 1;
        match node {
            Value::Array(items) => stack.extend(items),
            Value::Object(map) => stack.extend(map.values()),
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn paths(set: &ChangeSet) -> Vec<(String, ChangeKind)> {
        set.changes
            .iter()
            .map(|c| (c.path_string(), c.kind))
            .collect()
    }

    #[test]
    fn identical_values_no_changes() {
        let v = json!({"a": [1, 2, {"b": null}], "c": "x"});
        let set = diff(&v, &v);
        assert!(set.is_empty());
        assert_eq!(set.stat.left_nodes, set.stat.right_nodes);
    }

    #[test]
    fn keyed_changes_in_sorted_order() {
        let left = json!({"title": "new dataset", "description": "TODO"});
        let right = json!({
            "title": "changes",
            "homeURL": "http://example.com",
            "description": "great"
        });
        let set = diff(&left, &right);
        assert_eq!(
            paths(&set),
            vec![
                ("description".into(), ChangeKind::Update),
                ("homeURL".into(), ChangeKind::Insert),
                ("title".into(), ChangeKind::Update),
            ]
        );
        assert_eq!(set.stat.inserts, 1);
        assert_eq!(set.stat.updates, 2);
        assert_eq!(set.stat.deletes, 0);
    }

    #[test]
    fn recurses_into_nested_maps() {
        let left = json!({"formatConfig": {"headerRow": false, "lazyQuotes": true}});
        let right = json!({"formatConfig": {"headerRow": true, "lazyQuotes": true}});
        let set = diff(&left, &right);
        assert_eq!(paths(&set), vec![("formatConfig.headerRow".into(), ChangeKind::Update)]);
        assert_eq!(set.changes[0].old, Some(json!(false)));
        assert_eq!(set.changes[0].new, Some(json!(true)));
    }

    #[test]
    fn sequences_by_index() {
        let set = diff(&json!([1, 2, 3]), &json!([1, 5]));
        assert_eq!(
            paths(&set),
            vec![("1".into(), ChangeKind::Update), ("2".into(), ChangeKind::Delete)]
        );
    }

    #[test]
    fn type_change_is_an_update() {
        let set = diff(&json!({"a": {"b": 1}}), &json!({"a": [1]}));
        assert_eq!(paths(&set), vec![("a".into(), ChangeKind::Update)]);
    }

    #[test]
    fn scalar_roots() {
        let set = diff(&json!("a"), &json!("b"));
        assert_eq!(set.len(), 1);
        assert!(set.changes[0].path.is_empty());
        assert!(diff(&json!(1), &json!(1)).is_empty());
    }

    #[test]
    fn weights() {
        assert_eq!(weight(&json!("abc")), 3);
        assert_eq!(weight(&json!(42)), 2);
        assert_eq!(weight(&json!(true)), 4);
        assert_eq!(weight(&json!([])), 1);
        assert_eq!(weight(&json!([1, 2, 3])), 4);
        assert_eq!(weight(&json!({"a": "xy", "b": [1]})), 1 + 2 + 2);
    }

    #[test]
    fn stat_for_tagged_meta() {
        let left = json!({"qri": "md:0", "title": "example movie data"});
        let right = json!({"qri": "md:0", "title": "example city data"});
        let set = diff(&left, &right);
        assert_eq!(set.stat.left_nodes, 3);
        assert_eq!(set.stat.right_nodes, 3);
        assert_eq!(set.stat.left_weight, 45);
        assert_eq!(set.stat.right_weight, 43);
    }

    #[test]
    fn change_weights() {
        let set = diff(&json!({"a": "xx", "b": "yyyy"}), &json!({"a": "xxxxx", "c": [1, 2]}));
        let weights: Vec<usize> = set.changes.iter().map(Change::weight).collect();
        // a updated (max 2, 5), b removed (4), c added (3)
        assert_eq!(weights, vec![5, 4, 3]);
        assert_eq!(set.changed_weight(), 12);
    }

    #[test]
    fn node_counts() {
        assert_eq!(node_count(&json!(1)), 1);
        assert_eq!(node_count(&json!([1, [2, 3]])), 5);
        assert_eq!(node_count(&json!({})), 1);
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::from),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-c]{1,2}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn diff_is_deterministic(a in arb_json(), b in arb_json()) {
            prop_assert_eq!(diff(&a, &b), diff(&a, &b));
        }

        #[test]
        fn self_diff_is_empty(a in arb_json()) {
            prop_assert!(diff(&a, &a).is_empty());
        }

        #[test]
        fn diff_is_symmetric(a in arb_json(), b in arb_json()) {
            let forward = diff(&a, &b);
            let backward = diff(&b, &a);
            prop_assert_eq!(forward.stat.inserts, backward.stat.deletes);
            prop_assert_eq!(forward.stat.deletes, backward.stat.inserts);
            prop_assert_eq!(forward.stat.updates, backward.stat.updates);
            prop_assert_eq!(forward.changed_weight(), backward.changed_weight());
            let fwd: Vec<_> = forward.changes.iter().map(|c| c.path.clone()).collect();
            let bwd: Vec<_> = backward.changes.iter().map(|c| c.path.clone()).collect();
            prop_assert_eq!(fwd, bwd);
        }

        #[test]
        fn equal_iff_no_changes(a in arb_json(), b in arb_json()) {
            prop_assert_eq!(a == b, diff(&a, &b).is_empty());
        }
    }
}
