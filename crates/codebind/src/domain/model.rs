//! Domain models for selections, filters, and rendered artifacts.

use std::path::PathBuf;

/// Ordered list of user-chosen paths. Duplicates are kept as picked.
pub type Selection = Vec<PathBuf>;

/// Flat, ordered list of files produced by expanding a [`Selection`].
pub type ResolvedFileList = Vec<PathBuf>;

/// Include/exclude extension sets controlling which files a directory walk captures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSpec {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Options driving artifact assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    pub prepend_text: String,
    pub append_text: String,
    pub output_path: PathBuf,
    pub print_full_path: bool,
    pub print_folder_structure: bool,
    pub workspace_root: PathBuf,
}

/// Fully assembled output text, ready to be written in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub contents: String,
    pub file_count: usize,
}
