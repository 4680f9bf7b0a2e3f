//! Git integration used to locate the workspace root.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Lightweight wrapper around [`gix::Repository`] discovery.
#[derive(Default)]
pub struct GitClient {
    repo: Option<gix::Repository>,
}

impl GitClient {
    /// Attempt to locate a git repository starting from `path`.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self> {
        let repo = gix::discover(path).ok();
        Ok(Self { repo })
    }

    /// Root of the work tree if discovery succeeded and the repository is not bare.
    pub fn work_tree(&self) -> Option<PathBuf> {
        self.repo
            .as_ref()?
            .work_dir()
            .map(Path::to_path_buf)
    }
}

/// Determine the workspace root: the explicit directory if given, else the enclosing git work
/// tree, else the current directory.
pub fn workspace_root(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return std::path::absolute(dir)
            .with_context(|| format!("invalid workspace directory {}", dir.display()));
    }

    let cwd = env::current_dir().context("unable to determine working directory")?;
    let root = GitClient::discover(&cwd)?.work_tree().unwrap_or(cwd);
    std::path::absolute(&root)
        .with_context(|| format!("invalid workspace directory {}", root.display()))
}
