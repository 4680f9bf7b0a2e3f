//! The selection-to-artifact pipeline.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::app::assemble::Assembler;
use crate::app::selection::{SelectionMode, SelectionPersistence, SelectionStore};
use crate::app::traverse;
use crate::domain::model::{FilterSpec, RenderConfig};
use crate::infra::display::DocumentSink;
use crate::infra::lock::{OutputLock, lock_path};
use crate::infra::picker::PathPicker;

/// Inputs for one bind run.
#[derive(Debug, Clone)]
pub struct BindRequest {
    pub mode: SelectionMode,
    pub filter: FilterSpec,
    pub render: RenderConfig,
}

/// How a bind run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// Neither the fresh pick nor the persisted selection had any paths.
    NothingSelected,
    /// The artifact was written.
    Written { output: PathBuf, files: usize },
}

/// Run the whole pipeline: pick, update the selection, resolve, assemble, write, display.
///
/// Fatal failures come back as [`crate::domain::errors::BindError`] inside the error chain.
/// The output file is only touched once every input has been read successfully.
pub fn run<P: SelectionPersistence>(
    store: &mut SelectionStore<P>,
    picker: &mut dyn PathPicker,
    sink: &mut dyn DocumentSink,
    request: &BindRequest,
) -> Result<BindOutcome> {
    let mut picked = picker.pick_files().context("failed to pick files")?;
    picked.extend(picker.pick_folders().context("failed to pick folders")?);

    if picked.is_empty() {
        debug!("no fresh pick, using persisted selection");
    } else {
        let count = picked.len();
        store.apply(picked, request.mode);
        info!(picked = count, mode = ?request.mode, total = store.len(), "selection updated");
    }

    if store.is_empty() {
        info!("nothing selected");
        return Ok(BindOutcome::NothingSelected);
    }

    let selection = store.selection().to_vec();
    let output = request.render.output_path.clone();
    let skip = [output.clone(), lock_path(&output)];

    let files = traverse::resolve_skipping(&selection, &request.filter, &skip)?;
    debug!(files = files.len(), "selection resolved");

    let guard = OutputLock::acquire(&output)?;
    let assembler = Assembler::new(request.render.clone());
    let artifact = assembler.assemble(&files, &selection)?;
    let written = assembler.write(&artifact)?;
    drop(guard);

    info!(output = %written.display(), files = artifact.file_count, "artifact written");
    sink.display(&written).with_context(|| {
        format!(
            "artifact written to {} but could not be displayed",
            written.display()
        )
    })?;

    Ok(BindOutcome::Written {
        output: written,
        files: artifact.file_count,
    })
}
