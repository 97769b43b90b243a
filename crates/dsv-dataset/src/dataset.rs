use dsv_types::ContentPath;
use serde::{Deserialize, Serialize};

use crate::body::Body;
use crate::component::{Component, ComponentValue};
use crate::model::{Commit, Meta, Readme, Structure, Transform, Viz};

/// Root aggregate of a dataset version.
///
/// Serializes as the root manifest. `body` is the in-memory body supplied by
/// a caller and is never part of the manifest; persisted versions address
/// their body through `body_path`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<ContentPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<ContentPath>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub peername: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit: Option<Component<Commit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Component<Meta>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Component<Structure>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Component<Transform>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viz: Option<Component<Viz>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme: Option<Component<Readme>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_path: Option<ContentPath>,
    #[serde(skip)]
    pub body: Option<Body>,
}

fn populated<T: ComponentValue>(component: &Option<Component<T>>) -> bool {
    component.as_ref().is_some_and(|c| !c.is_empty())
}

fn inline<T: ComponentValue>(component: &Option<Component<T>>) -> Option<&T> {
    component.as_ref().and_then(Component::value)
}

impl Dataset {
    /// A dataset with no components.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no component, body, or body path is populated.
    pub fn is_empty(&self) -> bool {
        !(populated(&self.commit)
            || populated(&self.meta)
            || populated(&self.structure)
            || populated(&self.transform)
            || populated(&self.viz)
            || populated(&self.readme)
            || self.body.is_some()
            || self.body_path.is_some())
    }

    /// Whether any component is still a reference.
    pub fn has_references(&self) -> bool {
        [
            self.commit.as_ref().map(Component::is_reference),
            self.meta.as_ref().map(Component::is_reference),
            self.structure.as_ref().map(Component::is_reference),
            self.transform.as_ref().map(Component::is_reference),
            self.viz.as_ref().map(Component::is_reference),
            self.readme.as_ref().map(Component::is_reference),
        ]
        .into_iter()
        .any(|r| r == Some(true))
    }

    pub fn commit(&self) -> Option<&Commit> {
        inline(&self.commit)
    }

    pub fn meta(&self) -> Option<&Meta> {
        inline(&self.meta)
    }

    pub fn structure(&self) -> Option<&Structure> {
        inline(&self.structure)
    }

    pub fn transform(&self) -> Option<&Transform> {
        inline(&self.transform)
    }

    pub fn viz(&self) -> Option<&Viz> {
        inline(&self.viz)
    }

    pub fn readme(&self) -> Option<&Readme> {
        inline(&self.readme)
    }

    /// `peername/name`, or just `name` when no peername is set.
    pub fn reference_name(&self) -> String {
        if self.peername.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.peername, self.name)
        }
    }
}
