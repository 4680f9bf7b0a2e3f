//! Artifact assembly and output writing.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::app::tree;
use crate::domain::errors::BindError;
use crate::domain::model::{Artifact, RenderConfig};

const FOLDER_STRUCTURE_HEADER: &str = "==== Folder Structure ====\n";
const FILE_SEPARATOR: &str = "\n\n";

/// Builds the concatenated artifact and writes it to the configured output path.
#[derive(Debug, Clone)]
pub struct Assembler {
    config: RenderConfig,
}

impl Assembler {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Assemble the artifact in memory. Nothing is written; any unreadable file aborts.
    pub fn assemble(
        &self,
        files: &[PathBuf],
        selection: &[PathBuf],
    ) -> Result<Artifact, BindError> {
        let mut contents = String::new();

        if !self.config.prepend_text.is_empty() {
            contents.push_str(&self.config.prepend_text);
            contents.push_str("\n\n");
        }

        if self.config.print_folder_structure && !files.is_empty() {
            contents.push_str(FOLDER_STRUCTURE_HEADER);
            contents.push_str(&tree::render(&self.config.workspace_root, files, selection)?);
            contents.push('\n');
        }

        for file in files {
            let body = fs::read_to_string(file).map_err(|source| BindError::Read {
                path: file.clone(),
                source,
            })?;
            contents.push_str(&format!("==== {} ====\n", self.header_name(file)));
            contents.push_str(&body);
            contents.push_str(FILE_SEPARATOR);
        }

        if !self.config.append_text.is_empty() {
            contents.push_str(&self.config.append_text);
        }

        Ok(Artifact {
            contents,
            file_count: files.len(),
        })
    }

    /// Replace the output file with the artifact in a single rename.
    pub fn write(&self, artifact: &Artifact) -> Result<PathBuf, BindError> {
        let path = &self.config.output_path;
        write_atomically(path, artifact.contents.as_bytes()).map_err(|source| BindError::Write {
            path: path.clone(),
            source,
        })?;
        debug!(
            output = %path.display(),
            bytes = artifact.contents.len(),
            files = artifact.file_count,
            "artifact written"
        );
        Ok(path.clone())
    }

    fn header_name(&self, file: &Path) -> String {
        if self.config.print_full_path {
            return file.display().to_string();
        }
        file.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string())
    }
}

/// Write `data` to a temporary file beside `path`, then rename it into place.
pub(crate) fn write_atomically(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(data)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
