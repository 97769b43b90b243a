//! Positional row comparison of two body streams.

use serde_json::Value;

use crate::tree::{diff, weight, ChangeKind};

/// How one row position differs between two bodies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowChange {
    /// Zero-based row position.
    pub index: usize,
    pub kind: ChangeKind,
    /// Weight of the changed content in this row.
    pub weight: usize,
}

/// Result of comparing two bodies row by row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BodyDiff {
    pub rows: Vec<RowChange>,
    pub left_rows: usize,
    pub right_rows: usize,
    /// Weight of the left body as a sequence of rows.
    pub left_weight: usize,
    /// Weight of the right body as a sequence of rows.
    pub right_weight: usize,
    /// Sum of row change weights.
    pub changed_weight: usize,
}

impl BodyDiff {
    /// Returns `true` if both bodies hold equal rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of row positions that differ.
    pub fn affected_rows(&self) -> usize {
        self.rows.len()
    }

    /// Changed weight relative to the heavier body, in `[0, 1]`.
    pub fn change_ratio(&self) -> f64 {
        let total = self.left_weight.max(self.right_weight);
        if total == 0 {
            return 0.0;
        }
        (self.changed_weight as f64 / total as f64).min(1.0)
    }

    /// [`BodyDiff::change_ratio`] as a whole percentage. Any change reports at
    /// least 1%.
    pub fn percent(&self) -> u32 {
        if self.is_empty() {
            return 0;
        }
        ((self.change_ratio() * 100.0).round() as u32).clamp(1, 100)
    }
}

/// Compare two row streams position by position.
///
/// Each side is consumed exactly once and only the current row of each is
/// held. The first read error from either side aborts the comparison.
pub fn diff_rows<L, R, E>(left: L, right: R) -> Result<BodyDiff, E>
where
    L: IntoIterator<Item = Result<Value, E>>,
    R: IntoIterator<Item = Result<Value, E>>,
{
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    let mut out = BodyDiff {
        left_weight: 1,
        right_weight: 1,
        ..BodyDiff::default()
    };

    for index in 0.. {
        let change = match (left.next().transpose()?, right.next().transpose()?) {
            (None, None) => break,
            (Some(l), Some(r)) => {
                out.left_rows += 1;
                out.right_rows += 1;
                out.left_weight += weight(&l);
                out.right_weight += weight(&r);
                if l == r {
                    None
                } else {
                    Some((ChangeKind::Update, diff(&l, &r).changed_weight()))
                }
            }
            (Some(l), None) => {
                out.left_rows += 1;
                let w = weight(&l);
                out.left_weight += w;
                Some((ChangeKind::Delete, w))
            }
            (None, Some(r)) => {
                out.right_rows += 1;
                let w = weight(&r);
                out.right_weight += w;
                Some((ChangeKind::Insert, w))
            }
        };
        if let Some((kind, weight)) = change {
            out.changed_weight += weight;
            out.rows.push(RowChange {
                index,
                kind,
                weight,
            });
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::convert::Infallible;

    fn ok_rows(rows: Vec<Value>) -> impl Iterator<Item = Result<Value, Infallible>> {
        rows.into_iter().map(Ok)
    }

    fn fruit_rows(extra: bool) -> Vec<Value> {
        let mut rows = vec![
            json!({"fruit": "apple", "color": "red"}),
            json!({"fruit": "banana", "color": "yellow"}),
            json!({"fruit": "cherry", "color": "red"}),
        ];
        if extra {
            rows[1] = json!({"fruit": "blueberry", "color": "blue"});
            rows.push(json!({"fruit": "durian", "color": "green"}));
        }
        rows
    }

    #[test]
    fn equal_bodies() {
        let body = diff_rows(ok_rows(fruit_rows(false)), ok_rows(fruit_rows(false))).unwrap();
        assert!(body.is_empty());
        assert_eq!(body.left_rows, 3);
        assert_eq!(body.left_weight, body.right_weight);
        assert_eq!(body.percent(), 0);
    }

    #[test]
    fn update_and_insert() {
        let body = diff_rows(ok_rows(fruit_rows(false)), ok_rows(fruit_rows(true))).unwrap();
        let kinds: Vec<_> = body.rows.iter().map(|r| (r.index, r.kind)).collect();
        assert_eq!(kinds, vec![(1, ChangeKind::Update), (3, ChangeKind::Insert)]);
        assert_eq!(body.right_rows, 4);
    }

    #[test]
    fn deletes_at_tail() {
        let body = diff_rows(ok_rows(vec![json!(1), json!(2)]), ok_rows(vec![json!(1)])).unwrap();
        assert_eq!(
            body.rows,
            vec![RowChange {
                index: 1,
                kind: ChangeKind::Delete,
                weight: 1
            }]
        );
    }

    #[test]
    fn percent_of_numeric_grid() {
        let left: Vec<Value> = (0..10).map(|_| json!([1, 2, 3])).collect();
        let mut right = left.clone();
        for row in [2, 3, 5] {
            right[row] = json!([7, 8, 3]);
        }
        let body = diff_rows(ok_rows(left), ok_rows(right)).unwrap();
        assert_eq!(body.left_weight, 41);
        assert_eq!(body.changed_weight, 6);
        assert_eq!(body.affected_rows(), 3);
        assert_eq!(body.percent(), 15);
    }

    #[test]
    fn percent_is_clamped() {
        let body = diff_rows(ok_rows(vec![]), ok_rows(vec![json!("x".repeat(50))])).unwrap();
        assert_eq!(body.percent(), 98);
        let tiny = BodyDiff {
            rows: vec![RowChange {
                index: 0,
                kind: ChangeKind::Update,
                weight: 1,
            }],
            left_weight: 10_000,
            right_weight: 10_000,
            changed_weight: 1,
            ..BodyDiff::default()
        };
        assert_eq!(tiny.percent(), 1);
    }

    #[test]
    fn read_errors_abort() {
        let left = vec![Ok(json!(1)), Err("boom")];
        let right = vec![Ok(json!(1)), Ok(json!(2))];
        assert_eq!(diff_rows(left, right).unwrap_err(), "boom");
    }
}
