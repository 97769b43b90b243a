use std::io::Read;

use dsv_dataset::{codec, BodyRows, Dataset};
use dsv_store::ContentStore;
use dsv_types::ContentPath;
use tracing::debug;

use crate::error::{DsfsError, DsfsResult};
use crate::resolve::resolve_dataset;

/// Load the dataset whose manifest lives at `path`, with every component
/// resolved. The body is not read; see [`open_body`].
pub fn load(store: &dyn ContentStore, path: &ContentPath) -> DsfsResult<Dataset> {
    let bytes = store.get_bytes(path).map_err(DsfsError::ManifestBytes)?;
    let mut dataset = codec::decode_manifest(&bytes).map_err(DsfsError::ManifestDecode)?;
    resolve_dataset(&mut dataset, store)?;
    dataset.path = Some(path.clone());
    debug!(path = %path, name = %dataset.reference_name(), "loaded dataset");
    Ok(dataset)
}

/// Open a row reader over a stored dataset's body.
///
/// The structure must be resolved, since it decides how the body bytes are
/// parsed.
pub fn open_body(
    store: &dyn ContentStore,
    dataset: &Dataset,
) -> DsfsResult<BodyRows<Box<dyn Read + Send>>> {
    let body_path = dataset.body_path.as_ref().ok_or(DsfsError::NoBodyPath)?;
    let structure = dataset.structure().ok_or(DsfsError::StructureRequired)?;
    let reader = store.get(body_path)?;
    Ok(BodyRows::open(reader, structure)?)
}

/// Fetch script text stored at `path`.
pub fn load_script(store: &dyn ContentStore, path: &ContentPath) -> DsfsResult<String> {
    let bytes = store.get_bytes(path)?;
    String::from_utf8(bytes).map_err(|_| DsfsError::InvalidScript(path.clone()))
}
