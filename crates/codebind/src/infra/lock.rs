//! Exclusive lock serializing writers of the same output path.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use tracing::debug;

use crate::domain::errors::BindError;

/// Advisory lock on `<output>.lock`, held until drop.
///
/// The lock file itself is left in place. The OS releases the lock when the holder exits,
/// so a crashed run never blocks the next one.
#[derive(Debug)]
pub struct OutputLock {
    _file: File,
}

impl OutputLock {
    /// Take the lock for `output` without blocking. Fails with [`BindError::Busy`] while
    /// another run holds it.
    pub fn acquire(output: &Path) -> Result<Self, BindError> {
        let path = lock_path(output);
        let write_error = |source: io::Error| BindError::Write {
            path: output.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_error)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(write_error)?;

        match file.try_lock_exclusive() {
            Ok(true) => {
                debug!(lock = %path.display(), "acquired output lock");
                Ok(Self { _file: file })
            }
            Ok(false) => Err(BindError::Busy { lock: path }),
            Err(source) => Err(write_error(source)),
        }
    }
}

/// Lock file location for an output path.
pub fn lock_path(output: &Path) -> PathBuf {
    let mut name = output
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    output.with_file_name(name)
}
