//! Expansion of a selection into a flat list of files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::app::filter::ExtensionFilter;
use crate::domain::errors::BindError;
use crate::domain::model::{FilterSpec, ResolvedFileList};

/// Resolve every selected path into the files it stands for.
///
/// Directly selected files are kept regardless of the filter. Directories are walked
/// depth-first with entries sorted by name, and only files accepted by the filter are kept.
/// Symlinks are followed; a link back to one of its own ancestors is skipped.
pub fn resolve(selection: &[PathBuf], spec: &FilterSpec) -> Result<ResolvedFileList, BindError> {
    resolve_skipping(selection, spec, &[])
}

/// Like [`resolve`], but files found while walking a directory that are the same file as one
/// of `skip` are left out. Direct selections are never skipped.
pub fn resolve_skipping(
    selection: &[PathBuf],
    spec: &FilterSpec,
    skip: &[PathBuf],
) -> Result<ResolvedFileList, BindError> {
    let filter = ExtensionFilter::new(spec);
    let skip = SkipList::new(skip);
    let mut files = ResolvedFileList::new();

    for entry in selection {
        let metadata = fs::metadata(entry).map_err(|source| BindError::Traversal {
            path: entry.to_path_buf(),
            source,
        })?;

        if metadata.is_dir() {
            let before = files.len();
            expand_directory(entry, &filter, &skip, &mut files)?;
            debug!(
                dir = %entry.display(),
                files = files.len() - before,
                "expanded selected directory"
            );
        } else {
            files.push(entry.to_path_buf());
        }
    }

    Ok(files)
}

fn expand_directory(
    dir: &Path,
    filter: &ExtensionFilter,
    skip: &SkipList,
    files: &mut ResolvedFileList,
) -> Result<(), BindError> {
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                if let Some(ancestor) = err.loop_ancestor() {
                    warn!(
                        path = %err.path().unwrap_or(dir).display(),
                        ancestor = %ancestor.display(),
                        "skipping symlink cycle"
                    );
                    continue;
                }
                let path = err.path().unwrap_or(dir).to_path_buf();
                let source = err
                    .into_io_error()
                    .unwrap_or_else(|| io::Error::other("directory walk failed"));
                return Err(BindError::Traversal { path, source });
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            debug!(path = %entry.path().display(), "skipping special file");
            continue;
        }
        if skip.contains(entry.path()) {
            debug!(path = %entry.path().display(), "skipping output file");
            continue;
        }
        if filter.accepts(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(())
}

/// Paths compared by their resolved parent directory, so `a/../out.txt` and a route through
/// a symlinked directory both name the same file.
struct SkipList {
    paths: Vec<PathBuf>,
}

impl SkipList {
    fn new(paths: &[PathBuf]) -> Self {
        Self {
            paths: paths.iter().map(|path| normalize(path)).collect(),
        }
    }

    fn contains(&self, path: &Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        if !self.paths.iter().any(|skipped| skipped.file_name() == Some(name)) {
            return false;
        }
        let normalized = normalize(path);
        self.paths.contains(&normalized)
    }
}

fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let resolved = match (absolute.parent(), absolute.file_name()) {
        (Some(parent), Some(name)) => fs::canonicalize(parent).ok().map(|dir| dir.join(name)),
        _ => None,
    };
    resolved.unwrap_or(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(include: &[&str], exclude: &[&str]) -> FilterSpec {
        FilterSpec {
            include: include.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn project() -> anyhow::Result<tempfile::TempDir> {
        let temp = tempfile::tempdir()?;
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("sub"))?;
        fs::write(src.join("a.ts"), "a")?;
        fs::write(src.join("b.js"), "b")?;
        fs::write(src.join("sub/c.ts"), "c")?;
        Ok(temp)
    }

    #[test]
    fn expands_directories_depth_first_with_filter() -> anyhow::Result<()> {
        let temp = project()?;
        let src = temp.path().join("src");

        let files = resolve(&[src.clone()], &spec(&[".ts"], &[]))?;
        assert_eq!(files, vec![src.join("a.ts"), src.join("sub/c.ts")]);
        Ok(())
    }

    #[test]
    fn direct_file_selection_bypasses_filter() -> anyhow::Result<()> {
        let temp = project()?;
        let js = temp.path().join("src/b.js");

        let files = resolve(&[js.clone()], &spec(&[".ts"], &[".js"]))?;
        assert_eq!(files, vec![js]);
        Ok(())
    }

    #[test]
    fn keeps_selection_order_and_duplicates() -> anyhow::Result<()> {
        let temp = project()?;
        let src = temp.path().join("src");
        let js = src.join("b.js");

        let files = resolve(&[js.clone(), src.clone(), js.clone()], &spec(&[".ts"], &[]))?;
        assert_eq!(
            files,
            vec![js.clone(), src.join("a.ts"), src.join("sub/c.ts"), js]
        );
        Ok(())
    }

    #[test]
    fn exclude_wins_for_directory_members() -> anyhow::Result<()> {
        let temp = project()?;
        let src = temp.path().join("src");

        let files = resolve(&[src.clone()], &spec(&[".ts", ".js"], &[".ts"]))?;
        assert_eq!(files, vec![src.join("b.js")]);
        Ok(())
    }

    #[test]
    fn missing_path_is_a_traversal_error() {
        let missing = PathBuf::from("/definitely/not/here/codebind");
        let err = resolve(&[missing.clone()], &FilterSpec::default()).unwrap_err();
        match err {
            BindError::Traversal { path, .. } => assert_eq!(path, missing),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn skipped_paths_only_apply_to_directory_members() -> anyhow::Result<()> {
        let temp = project()?;
        let src = temp.path().join("src");
        let skip = vec![src.join("sub/../a.ts")];

        let files = resolve_skipping(&[src.clone()], &spec(&[".ts"], &[]), &skip)?;
        assert_eq!(files, vec![src.join("sub/c.ts")]);

        let direct = src.join("a.ts");
        let files = resolve_skipping(&[direct.clone()], &spec(&[".ts"], &[]), &skip)?;
        assert_eq!(files, vec![direct]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycles_terminate() -> anyhow::Result<()> {
        let temp = project()?;
        let src = temp.path().join("src");
        std::os::unix::fs::symlink(&src, src.join("sub/loop"))?;

        let files = resolve(&[src.clone()], &spec(&[".ts"], &[]))?;
        assert_eq!(files, vec![src.join("a.ts"), src.join("sub/c.ts")]);
        Ok(())
    }
}
