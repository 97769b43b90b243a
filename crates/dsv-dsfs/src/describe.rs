//! Commit descriptions generated from the difference between two versions.
//!
//! Every description has a one-line short form, used as a commit title, and
//! a long form listing each change on its own line. Components are reported
//! in a fixed order regardless of how the datasets were built:
//!
//! ```text
//! meta, structure, readme, transform, viz, body
//! ```

use std::io::Cursor;

use bytes::Bytes;
use dsv_dataset::{
    BodyRows, Component, ComponentKind, ComponentValue, Dataset, DatasetError,
    DatasetResult, Structure,
};
use dsv_diff::{diff, diff_rows, BodyDiff, Change};
use dsv_types::ContentPath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors from describing a change.
#[derive(Debug, Error)]
pub enum DescribeError {
    /// Nothing differs and the update was not forced.
    #[error("no changes")]
    NoChanges,

    #[error("error reading body: {0}")]
    Body(#[from] DatasetError),
}

/// Short and long commit descriptions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Description {
    pub short: String,
    pub long: String,
}

impl Description {
    fn same(text: &str) -> Self {
        Self {
            short: text.to_string(),
            long: text.to_string(),
        }
    }
}

/// When body changes are listed row by row instead of summarized as a
/// percentage.
///
/// A body change is itemized while its weight ratio stays at or below
/// `max_itemized_percent` and it touches no more than `max_itemized_rows`
/// rows. Anything larger reads "changed by P%".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BodyChangePolicy {
    /// Largest change weight ratio, as a whole percentage, that is still
    /// itemized.
    pub max_itemized_percent: u32,
    /// Largest number of affected rows that is still itemized.
    pub max_itemized_rows: usize,
}

impl BodyChangePolicy {
    /// Whether `body` is described row by row.
    pub fn itemizes(&self, body: &BodyDiff) -> bool {
        body.percent() <= self.max_itemized_percent
            && body.affected_rows() <= self.max_itemized_rows
    }
}

impl Default for BodyChangePolicy {
    fn default() -> Self {
        Self {
            max_itemized_percent: 70,
            max_itemized_rows: 3,
        }
    }
}

/// One component's share of a description.
struct Block {
    name: &'static str,
    short: String,
    long: String,
}

impl Block {
    fn single(name: &'static str, text: String) -> Self {
        Self {
            name,
            short: text.clone(),
            long: text,
        }
    }

    /// A block listing `lines`, summarized as `summary` when there are
    /// several.
    fn listed(name: &'static str, lines: Vec<String>, summary: String) -> Self {
        let short = if lines.len() == 1 {
            format!("{name} {}", lines[0])
        } else {
            format!("{name} {summary}")
        };
        Self {
            name,
            short,
            long: format!("{name}:\n\t{}", lines.join("\n\t")),
        }
    }
}

/// A component reduced to what descriptions compare.
enum Facet {
    Absent,
    Reference(ContentPath),
    Value(Value),
}

impl Facet {
    fn of<T: ComponentValue>(component: &Option<Component<T>>) -> Self {
        match component {
            None => Self::Absent,
            Some(Component::Reference(path)) => Self::Reference(path.clone()),
            Some(Component::Inline(value)) if value.is_empty() => Self::Absent,
            Some(Component::Inline(value)) => {
                serde_json::to_value(value).map_or(Self::Absent, Self::Value)
            }
        }
    }
}

/// Generates commit descriptions.
#[derive(Clone, Copy, Debug, Default)]
pub struct Describer {
    policy: BodyChangePolicy,
}

impl Describer {
    pub fn new(policy: BodyChangePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> BodyChangePolicy {
        self.policy
    }

    /// Describe the change from `prev` to `next`. A missing dataset counts as
    /// empty.
    ///
    /// Bodies are compared only when both datasets carry one in memory.
    pub fn describe(
        &self,
        prev: Option<&Dataset>,
        next: Option<&Dataset>,
        force: bool,
    ) -> Result<Description, DescribeError> {
        let body = match (prev.and_then(in_memory_rows), next.and_then(in_memory_rows)) {
            (Some(left), Some(right)) => Some(diff_rows(left?, right?)?),
            _ => None,
        };
        self.describe_with_body(prev, next, body.as_ref(), force)
    }

    /// Describe the change from `prev` to `next` given an already computed
    /// body comparison.
    pub fn describe_with_body(
        &self,
        prev: Option<&Dataset>,
        next: Option<&Dataset>,
        body: Option<&BodyDiff>,
        force: bool,
    ) -> Result<Description, DescribeError> {
        let empty = Dataset::default();
        let prev = prev.unwrap_or(&empty);
        let next = next.unwrap_or(&empty);

        if prev.is_empty() && !next.is_empty() {
            return Ok(Description::same("created dataset"));
        }

        let mut blocks = Vec::new();
        blocks.extend(component_block(
            ComponentKind::Meta,
            Facet::of(&prev.meta),
            Facet::of(&next.meta),
        ));
        blocks.extend(component_block(
            ComponentKind::Structure,
            structure_facet(&prev.structure),
            structure_facet(&next.structure),
        ));
        blocks.extend(component_block(
            ComponentKind::Readme,
            Facet::of(&prev.readme),
            Facet::of(&next.readme),
        ));
        blocks.extend(transform_block(Facet::of(&prev.transform), Facet::of(&next.transform)));
        blocks.extend(component_block(
            ComponentKind::Viz,
            Facet::of(&prev.viz),
            Facet::of(&next.viz),
        ));
        if let Some(body) = body.filter(|b| !b.is_empty()) {
            blocks.push(self.body_block(body));
        }

        match blocks.len() {
            0 if force => Ok(Description::same("forced update")),
            0 => Err(DescribeError::NoChanges),
            1 => {
                let block = blocks.remove(0);
                Ok(Description {
                    short: block.short,
                    long: block.long,
                })
            }
            _ => {
                let names: Vec<&str> = blocks.iter().map(|b| b.name).collect();
                let longs: Vec<&str> = blocks.iter().map(|b| b.long.as_str()).collect();
                Ok(Description {
                    short: format!("updated {}", natural_list(&names)),
                    long: longs.join("\n"),
                })
            }
        }
    }

    fn body_block(&self, body: &BodyDiff) -> Block {
        const NAME: &str = "body";
        if self.policy.itemizes(body) {
            let lines: Vec<String> = body
                .rows
                .iter()
                .map(|row| format!("{} row {}", row.kind.verb(), row.index))
                .collect();
            let summary = natural_list(&lines);
            return Block::listed(NAME, lines, summary);
        }
        let line = format!("changed by {}%", body.percent());
        Block::listed(NAME, vec![line.clone()], line)
    }
}

/// Describe with the default body policy.
pub fn describe(
    prev: Option<&Dataset>,
    next: Option<&Dataset>,
    force: bool,
) -> Result<Description, DescribeError> {
    Describer::default().describe(prev, next, force)
}

fn structure_facet(component: &Option<Component<Structure>>) -> Facet {
    // Stats follow the body; the body is described on its own.
    match component {
        Some(Component::Inline(structure)) => {
            Facet::of(&Some(Component::Inline(structure.without_stats())))
        }
        other => Facet::of(other),
    }
}

fn component_block(kind: ComponentKind, prev: Facet, next: Facet) -> Option<Block> {
    let name = kind.name();
    let (left, right) = match (prev, next) {
        (Facet::Absent, Facet::Absent) => return None,
        (_, Facet::Absent) => return Some(Block::single(name, format!("{name} removed"))),
        (Facet::Reference(a), Facet::Reference(b)) if a == b => return None,
        (Facet::Reference(_), _) | (_, Facet::Reference(_)) => {
            return Some(Block::single(name, format!("{name} updated")))
        }
        (Facet::Absent, Facet::Value(v)) => (Value::Object(Map::new()), v),
        (Facet::Value(a), Facet::Value(b)) => (a, b),
    };
    let changes = diff(&left, &right);
    if changes.is_empty() {
        return None;
    }
    let lines: Vec<String> = changes.changes.iter().map(field_line).collect();
    let summary = format!("updated {} fields", lines.len());
    Some(Block::listed(name, lines, summary))
}

fn transform_block(prev: Facet, next: Facet) -> Option<Block> {
    const NAME: &str = "transform";
    let text = match (&prev, &next) {
        (Facet::Absent, Facet::Absent) => return None,
        (_, Facet::Absent) => "transform removed",
        (Facet::Absent, _) => "transform added",
        (Facet::Reference(a), Facet::Reference(b)) if a == b => return None,
        (Facet::Value(a), Facet::Value(b)) if a == b => return None,
        _ => "transform updated",
    };
    Some(Block::single(NAME, text.to_string()))
}

fn field_line(change: &Change) -> String {
    format!("{} {}", change.kind.verb(), change.path_string())
}

/// Rows of a body held in memory, read with the dataset's structure.
fn in_memory_rows(dataset: &Dataset) -> Option<DatasetResult<BodyRows<Cursor<Bytes>>>> {
    let body = dataset.body.as_ref()?;
    let mut structure = dataset.structure().cloned().unwrap_or_default();
    if structure.format.is_none() {
        structure.format = body.format_hint();
    }
    Some(body.rows(&structure))
}

/// Join items as prose: `a`, `a and b`, `a, b, and c`.
fn natural_list<S: AsRef<str>>(items: &[S]) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [a, b] => format!("{} and {}", a.as_ref(), b.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}
