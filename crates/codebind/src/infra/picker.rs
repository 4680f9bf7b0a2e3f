//! Path pickers feeding fresh selections into the pipeline.

use std::io::{self, Write};
use std::mem;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reedline::{DefaultPrompt, DefaultPromptSegment, Reedline, Signal};

/// Source of a fresh pick. Either list may be empty; an empty pick means "dismissed".
pub trait PathPicker {
    fn pick_files(&mut self) -> Result<Vec<PathBuf>>;
    fn pick_folders(&mut self) -> Result<Vec<PathBuf>>;
}

/// Picker over paths given up front, e.g. on the command line.
///
/// Existing directories are offered as folders, everything else as files so that missing
/// paths still surface as traversal errors later on.
#[derive(Debug, Default, Clone)]
pub struct ArgsPicker {
    files: Vec<PathBuf>,
    folders: Vec<PathBuf>,
}

impl ArgsPicker {
    /// Classify `paths`, resolving relative ones against `base`.
    pub fn new(paths: impl IntoIterator<Item = PathBuf>, base: &Path) -> Self {
        let mut picker = Self::default();
        for path in paths {
            let path = if path.is_absolute() {
                path
            } else {
                base.join(path)
            };
            if path.is_dir() {
                picker.folders.push(path);
            } else {
                picker.files.push(path);
            }
        }
        picker
    }
}

impl PathPicker for ArgsPicker {
    fn pick_files(&mut self) -> Result<Vec<PathBuf>> {
        Ok(mem::take(&mut self.files))
    }

    fn pick_folders(&mut self) -> Result<Vec<PathBuf>> {
        Ok(mem::take(&mut self.folders))
    }
}

/// Interactive picker reading one path per line from a line editor.
///
/// An empty line or Ctrl-D finishes the current list; Ctrl-C dismisses it.
pub struct PromptPicker {
    editor: Reedline,
    base: PathBuf,
}

impl PromptPicker {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            editor: Reedline::create(),
            base: base.into(),
        }
    }

    fn read_paths(&mut self, label: &str) -> Result<Vec<PathBuf>> {
        let mut stderr = io::stderr();
        writeln!(
            stderr,
            "Enter {label} to bind, one per line (empty line to finish, Ctrl-C to skip):"
        )?;

        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic(label.to_owned()),
            DefaultPromptSegment::Empty,
        );

        let mut paths = Vec::new();
        loop {
            let signal = self
                .editor
                .read_line(&prompt)
                .with_context(|| format!("failed to read {label} from prompt"))?;
            match signal {
                Signal::Success(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        break;
                    }
                    paths.push(self.base.join(trimmed));
                }
                Signal::CtrlD => break,
                Signal::CtrlC => return Ok(Vec::new()),
            }
        }
        Ok(paths)
    }
}

impl PathPicker for PromptPicker {
    fn pick_files(&mut self) -> Result<Vec<PathBuf>> {
        self.read_paths("files")
    }

    fn pick_folders(&mut self) -> Result<Vec<PathBuf>> {
        self.read_paths("folders")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn args_picker_splits_files_and_folders() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::create_dir_all(temp.path().join("src"))?;
        fs::write(temp.path().join("README.md"), "readme")?;

        let mut picker = ArgsPicker::new(
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("src"),
                PathBuf::from("missing.rs"),
            ],
            temp.path(),
        );

        assert_eq!(
            picker.pick_files()?,
            vec![temp.path().join("README.md"), temp.path().join("missing.rs")]
        );
        assert_eq!(picker.pick_folders()?, vec![temp.path().join("src")]);
        assert!(picker.pick_files()?.is_empty());
        Ok(())
    }

    #[test]
    fn absolute_paths_are_kept() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let mut picker = ArgsPicker::new(vec![temp.path().to_path_buf()], Path::new("/elsewhere"));
        assert_eq!(picker.pick_folders()?, vec![temp.path().to_path_buf()]);
        Ok(())
    }
}
