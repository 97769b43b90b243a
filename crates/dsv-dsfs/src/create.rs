//! The version create pipeline.
//!
//! `create` turns a caller-seeded dataset into a signed, persisted version:
//! it settles the previous version, computes body statistics in one pass,
//! describes the change, signs the commit and hands the result to
//! [`write`](crate::write). Every check runs before anything is stored, so
//! a rejected version leaves the store as it was.

use std::io::{Cursor, Read};

use dsv_dataset::{
    Body, BodyFile, BodyRows, Component, ComponentValue, Dataset, Scripted, Structure,
};
use dsv_diff::{diff_rows, BodyDiff};
use dsv_store::ContentStore;
use dsv_types::ContentPath;
use tracing::{debug, info, warn};

use crate::config::CreateConfig;
use crate::describe::Describer;
use crate::error::{DsfsError, DsfsResult};
use crate::load::{load, load_script};
use crate::resolve::resolve_dataset;
use crate::stats::compute_stats;
use crate::write::write;

type StoredRows = BodyRows<Box<dyn Read + Send>>;

/// Create a new version of a dataset and return the path of its manifest.
///
/// `next` must carry a commit, which may be empty: a missing title or
/// message is filled in from the generated description. `prev` is the
/// version being replaced, if any; a dataset holding only a `path` is loaded
/// from the store first.
pub fn create(
    store: &dyn ContentStore,
    mut next: Dataset,
    prev: Option<Dataset>,
    config: &CreateConfig,
) -> DsfsResult<ContentPath> {
    let signer = config.signer.as_ref().ok_or(DsfsError::SignerRequired)?;

    let mut prev = settle_previous(store, prev)?;
    if !prev.is_empty() {
        if prev.commit.is_none() {
            return Err(DsfsError::CommitRequired);
        }
        if prev.structure().is_none() {
            return Err(DsfsError::StructureRequired);
        }
    }

    resolve_dataset(&mut next, store)?;
    if next.commit.is_none() {
        return Err(DsfsError::CommitRequired);
    }

    let mut structure = next
        .structure()
        .cloned()
        .or_else(|| prev.structure().map(Structure::without_stats))
        .or_else(|| {
            next.body
                .as_ref()
                .and_then(Body::format_hint)
                .map(Structure::with_format)
        })
        .ok_or(DsfsError::StructureRequired)?;
    if structure.format.is_none() {
        structure.format = next
            .body
            .as_ref()
            .and_then(Body::format_hint)
            .or_else(|| prev.structure().and_then(|s| s.format));
    }

    // Settle the body as encoded bytes, or reuse a stored one.
    match next.body.take() {
        Some(body) => {
            let format = structure.data_format()?;
            let data = body.encode(&structure)?;
            next.body = Some(Body::File(BodyFile {
                name: format!("body.{}", format.extension()),
                data,
            }));
        }
        None => {
            let reused = next.body_path.clone().or_else(|| prev.body_path.clone());
            next.body_path = Some(reused.ok_or(DsfsError::BodyRequired)?);
        }
    }

    let stats = match (&next.body, &next.body_path) {
        (Some(Body::File(file)), _) => {
            compute_stats(Cursor::new(file.data.clone()), &structure, config.validator.as_ref())?
        }
        (_, Some(path)) => compute_stats(store.get(path)?, &structure, config.validator.as_ref())?,
        _ => return Err(DsfsError::BodyRequired),
    };
    debug!(
        entries = stats.entries,
        err_count = stats.err_count,
        length = stats.length,
        depth = stats.depth,
        "computed body stats"
    );
    if config.strict && stats.err_count > 0 {
        warn!(err_count = stats.err_count, "body failed schema validation in strict mode");
        return Err(DsfsError::StrictValidation {
            err_count: stats.err_count,
        });
    }
    stats.apply(&mut structure);
    next.structure = Some(Component::Inline(structure));

    inline_scripts(store, &mut prev)?;
    inline_scripts(store, &mut next)?;

    let body = compare_bodies(store, &prev, &next)?;
    let description = Describer::new(config.body_policy).describe_with_body(
        Some(&prev),
        Some(&next),
        body.as_ref(),
        config.force,
    )?;

    let mut commit = next
        .commit
        .take()
        .and_then(Component::into_value)
        .unwrap_or_default();
    if commit.title.is_empty() {
        commit.title = description.short;
    }
    if commit.message.is_empty() {
        commit.message = description.long;
    }
    commit.timestamp = Some(config.clock.now());
    commit.author = config.effective_author();
    commit.signature = None;
    let signature = signer.sign(&commit.signing_bytes()?)?;
    commit.signature = Some(hex::encode(signature));
    let title = commit.title.clone();
    next.commit = Some(Component::Inline(commit));

    next.path = None;
    next.previous_path = prev.path.clone();
    let path = write(store, &next, config.pin)?;
    info!(
        path = %path,
        previous = ?next.previous_path,
        title = %title,
        "created dataset version"
    );
    Ok(path)
}

/// Load and resolve the previous version. A missing previous version is the
/// empty dataset.
fn settle_previous(store: &dyn ContentStore, prev: Option<Dataset>) -> DsfsResult<Dataset> {
    let Some(mut prev) = prev else {
        return Ok(Dataset::default());
    };
    if prev.is_empty() {
        if let Some(path) = prev.path.clone() {
            prev = load(store, &path)?;
        }
    }
    resolve_dataset(&mut prev, store)?;
    Ok(prev)
}

/// Bring stored scripts inline so both versions compare by script content.
fn inline_scripts(store: &dyn ContentStore, dataset: &mut Dataset) -> DsfsResult<()> {
    inline_script(store, &mut dataset.transform)?;
    inline_script(store, &mut dataset.viz)?;
    inline_script(store, &mut dataset.readme)?;
    Ok(())
}

fn inline_script<T: ComponentValue + Scripted>(
    store: &dyn ContentStore,
    component: &mut Option<Component<T>>,
) -> DsfsResult<()> {
    let Some(value) = component.as_mut().and_then(Component::value_mut) else {
        return Ok(());
    };
    if value.script_bytes().is_some() {
        return Ok(());
    }
    if let Some(path) = value.script_path().cloned() {
        let script = load_script(store, &path)?;
        value.set_script_bytes(script);
        value.set_script_path(None);
    }
    Ok(())
}

/// Compare the two bodies row by row, when both can be read.
fn compare_bodies(
    store: &dyn ContentStore,
    prev: &Dataset,
    next: &Dataset,
) -> DsfsResult<Option<BodyDiff>> {
    if prev.is_empty() {
        return Ok(None);
    }
    if next.body.is_none() && next.body_path.is_some() && next.body_path == prev.body_path {
        return Ok(None);
    }
    let (Some(prev_structure), Some(next_structure)) = (prev.structure(), next.structure()) else {
        return Ok(None);
    };
    let left = match rows_of(store, prev, prev_structure) {
        Ok(Some(rows)) => rows,
        Ok(None) => return Ok(None),
        Err(e) => {
            warn!(error = %e, "previous body is unreadable; skipping body comparison");
            return Ok(None);
        }
    };
    let Some(right) = rows_of(store, next, next_structure)? else {
        return Ok(None);
    };
    Ok(Some(diff_rows(left, right)?))
}

fn rows_of(
    store: &dyn ContentStore,
    dataset: &Dataset,
    structure: &Structure,
) -> DsfsResult<Option<StoredRows>> {
    let rows = match (&dataset.body, &dataset.body_path) {
        (Some(Body::Rows(rows)), _) => BodyRows::Values(rows.clone().into_iter()),
        (Some(Body::File(file)), _) => {
            let reader: Box<dyn Read + Send> = Box::new(Cursor::new(file.data.clone()));
            BodyRows::open(reader, structure)?
        }
        (None, Some(path)) => BodyRows::open(store.get(path)?, structure)?,
        (None, None) => return Ok(None),
    };
    Ok(Some(rows))
}
