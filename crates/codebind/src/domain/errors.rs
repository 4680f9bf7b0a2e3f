//! Domain-specific errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal failures of a bind run. An empty selection is not one of them.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("cannot access selected path {}", path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot read {} as text", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("cannot write output to {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("another bind is already writing this output (lock held at {})", lock.display())]
    Busy { lock: PathBuf },
}
