//! Reference resolution.
//!
//! A manifest references at most one document per component kind, and
//! scripts hang off transform, viz and readme documents. Resolution follows
//! exactly those edges; nothing here walks an open-ended graph.

use dsv_dataset::{codec, Component, ComponentValue, Dataset};
use dsv_store::ContentStore;
use dsv_types::ContentPath;

use crate::error::{DsfsError, DsfsResult, ResolveError};

/// Replace a reference with the decoded document it points at. Inline
/// components are returned unchanged.
pub fn resolve<T: ComponentValue>(
    component: Component<T>,
    store: &dyn ContentStore,
) -> Result<Component<T>, ResolveError> {
    match component {
        Component::Reference(path) => fetch(store, &path).map(Component::Inline),
        inline => Ok(inline),
    }
}

fn fetch<T: ComponentValue>(store: &dyn ContentStore, path: &ContentPath) -> Result<T, ResolveError> {
    let bytes = store.get_bytes(path)?;
    Ok(codec::decode(&bytes)?)
}

fn resolve_slot<T: ComponentValue>(
    slot: &mut Option<Component<T>>,
    store: &dyn ContentStore,
) -> DsfsResult<()> {
    if let Some(component) = slot.take() {
        let resolved = resolve(component, store).map_err(|e| DsfsError::component(T::KIND, e))?;
        *slot = Some(resolved);
    }
    Ok(())
}

/// Resolve every referenced component of `dataset` in place.
pub fn resolve_dataset(dataset: &mut Dataset, store: &dyn ContentStore) -> DsfsResult<()> {
    resolve_slot(&mut dataset.meta, store)?;
    resolve_slot(&mut dataset.structure, store)?;
    resolve_slot(&mut dataset.transform, store)?;
    resolve_slot(&mut dataset.commit, store)?;
    resolve_slot(&mut dataset.viz, store)?;
    resolve_slot(&mut dataset.readme, store)?;
    Ok(())
}
