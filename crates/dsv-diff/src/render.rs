//! Human and machine renderings of a top-level diff.
//!
//! Both renderings list the top-level keys of the two values in sorted order:
//! unchanged keys once, changed keys as a removal of the old value followed by
//! an addition of the new one.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DiffError, DiffResult};
use crate::tree::{diff, DiffStat};

/// Output format of a rendered diff.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Marker {
    Same,
    Removed,
    Added,
}

impl Marker {
    fn symbol(self) -> &'static str {
        match self {
            Self::Same => " ",
            Self::Removed => "-",
            Self::Added => "+",
        }
    }
}

struct Line<'a> {
    marker: Marker,
    key: &'a str,
    value: &'a Value,
}

impl<'a> Line<'a> {
    fn new(marker: Marker, key: &'a str, value: &'a Value) -> Self {
        Self { marker, key, value }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonStat {
    left_nodes: usize,
    right_nodes: usize,
    left_weight: usize,
    right_weight: usize,
    inserts: usize,
    deletes: usize,
}

impl From<DiffStat> for JsonStat {
    fn from(stat: DiffStat) -> Self {
        // An update reads as one deletion plus one insertion.
        Self {
            left_nodes: stat.left_nodes,
            right_nodes: stat.right_nodes,
            left_weight: stat.left_weight,
            right_weight: stat.right_weight,
            inserts: stat.inserts + stat.updates,
            deletes: stat.deletes + stat.updates,
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    stat: JsonStat,
    diff: Vec<(&'static str, &'a str, &'a Value)>,
}

/// Render the diff between two values.
///
/// Fails with [`DiffError::NothingToDiff`] when neither side is given. A
/// missing side compares as an empty object when the other side is an
/// object, and as null otherwise.
pub fn render(
    left: Option<&Value>,
    right: Option<&Value>,
    format: OutputFormat,
) -> DiffResult<String> {
    let blank = |other: &Value| {
        if other.is_object() {
            Value::Object(Map::new())
        } else {
            Value::Null
        }
    };
    let (left, right) = match (left, right) {
        (None, None) => return Err(DiffError::NothingToDiff),
        (Some(l), Some(r)) => (l.clone(), r.clone()),
        (Some(l), None) => (l.clone(), blank(l)),
        (None, Some(r)) => (blank(r), r.clone()),
    };
    let stat = JsonStat::from(diff(&left, &right).stat);
    let lines = top_level_lines(&left, &right);

    match format {
        OutputFormat::Text => Ok(render_text(&stat, &lines)),
        OutputFormat::Json => {
            let report = JsonReport {
                stat,
                diff: lines
                    .iter()
                    .map(|line| (line.marker.symbol(), line.key, line.value))
                    .collect(),
            };
            Ok(serde_json::to_string(&report)?)
        }
    }
}

fn render_text(stat: &JsonStat, lines: &[Line<'_>]) -> String {
    let delta = stat.right_nodes as i64 - stat.left_nodes as i64;
    let delta = if delta > 0 {
        format!("+{delta}")
    } else {
        delta.to_string()
    };
    let mut out = format!(
        "{} {}. {} {}. {} {}.",
        delta,
        plural(stat.right_nodes.abs_diff(stat.left_nodes), "element"),
        stat.inserts,
        plural(stat.inserts, "insert"),
        stat.deletes,
        plural(stat.deletes, "delete"),
    );
    if !lines.is_empty() {
        out.push('\n');
    }
    for line in lines {
        out.push('\n');
        out.push_str(line.marker.symbol());
        if !line.key.is_empty() {
            out.push_str(line.key);
            out.push_str(": ");
        }
        out.push_str(&line.value.to_string());
    }
    out
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Entries of a value at the top level: an object's fields, nothing for
/// null, or the value itself under an empty key.
fn entries(value: &Value) -> Vec<(&str, &Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
        Value::Null => Vec::new(),
        other => vec![("", other)],
    }
}

fn top_level_lines<'a>(left: &'a Value, right: &'a Value) -> Vec<Line<'a>> {
    let mut left = entries(left);
    let mut right = entries(right);
    left.sort_by_key(|(k, _)| *k);
    right.sort_by_key(|(k, _)| *k);

    let mut lines = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < left.len() || j < right.len() {
        let next_left = left.get(i);
        let next_right = right.get(j);
        match (next_left, next_right) {
            (Some(&(lk, lv)), Some(&(rk, rv))) if lk == rk => {
                if lv == rv {
                    lines.push(Line::new(Marker::Same, lk, lv));
                } else {
                    lines.push(Line::new(Marker::Removed, lk, lv));
                    lines.push(Line::new(Marker::Added, rk, rv));
                }
                i += 1;
                j += 1;
            }
            (Some(&(lk, lv)), Some(&(rk, _))) if lk < rk => {
                lines.push(Line::new(Marker::Removed, lk, lv));
                i += 1;
            }
            (Some(&(lk, lv)), None) => {
                lines.push(Line::new(Marker::Removed, lk, lv));
                i += 1;
            }
            (_, Some(&(rk, rv))) => {
                lines.push(Line::new(Marker::Added, rk, rv));
                j += 1;
            }
            (None, None) => break,
        }
    }
    lines
}
