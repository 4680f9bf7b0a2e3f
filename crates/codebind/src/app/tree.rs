//! Folder structure rendering pruned to the selection.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::domain::errors::BindError;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE_INDENT: &str = "│   ";
const SPACE_INDENT: &str = "    ";

/// Renders an ASCII tree rooted at a workspace directory.
///
/// Only entries that are resolved files, contain a resolved file, or are (or contain) a
/// selected path are shown. Siblings are listed by name; the `└──` connector goes to the last
/// *retained* sibling. A directory that resolves to one of its own ancestors is not entered.
pub struct FolderTree<'a> {
    files: &'a [PathBuf],
    selection: &'a [PathBuf],
    ancestors: Vec<PathBuf>,
}

impl<'a> FolderTree<'a> {
    pub fn new(files: &'a [PathBuf], selection: &'a [PathBuf]) -> Self {
        Self {
            files,
            selection,
            ancestors: Vec::new(),
        }
    }

    /// Walk `root` and return the rendered tree, one `\n`-terminated line per entry.
    pub fn render(mut self, root: &Path) -> Result<String, BindError> {
        let mut output = String::new();
        output.push_str(&display_name(root));
        output.push('\n');
        self.render_dir(root, "", &mut output)?;
        Ok(output)
    }

    fn render_dir(
        &mut self,
        dir: &Path,
        prefix: &str,
        output: &mut String,
    ) -> Result<(), BindError> {
        let canonical = fs::canonicalize(dir).map_err(|source| traversal(dir, source))?;
        if self.ancestors.contains(&canonical) {
            warn!(dir = %dir.display(), "skipping symlink cycle");
            return Ok(());
        }
        self.ancestors.push(canonical);
        let rendered = self.render_children(dir, prefix, output);
        self.ancestors.pop();
        rendered
    }

    fn render_children(
        &mut self,
        dir: &Path,
        prefix: &str,
        output: &mut String,
    ) -> Result<(), BindError> {
        let retained: Vec<PathBuf> = list_children(dir)?
            .into_iter()
            .filter(|child| self.is_retained(child))
            .collect();

        for (index, child) in retained.iter().enumerate() {
            let is_last = index + 1 == retained.len();
            output.push_str(prefix);
            output.push_str(if is_last { LAST_BRANCH } else { BRANCH });
            output.push_str(&display_name(child));
            output.push('\n');

            if child.is_dir() {
                let indent = if is_last { SPACE_INDENT } else { PIPE_INDENT };
                let child_prefix = format!("{prefix}{indent}");
                self.render_dir(child, &child_prefix, output)?;
            }
        }

        Ok(())
    }

    fn is_retained(&self, child: &Path) -> bool {
        self.files.iter().any(|file| file.starts_with(child))
            || self.selection.iter().any(|selected| selected.starts_with(child))
    }
}

/// Convenience wrapper around [`FolderTree`].
pub fn render(root: &Path, files: &[PathBuf], selection: &[PathBuf]) -> Result<String, BindError> {
    FolderTree::new(files, selection).render(root)
}

fn list_children(dir: &Path) -> Result<Vec<PathBuf>, BindError> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(|source| traversal(dir, source))? {
        let entry = entry.map_err(|source| traversal(dir, source))?;
        children.push(entry.path());
    }
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(children)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn traversal(path: &Path, source: std::io::Error) -> BindError {
    BindError::Traversal {
        path: path.to_path_buf(),
        source,
    }
}
