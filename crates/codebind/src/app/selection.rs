//! Managing the persisted path selection.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::ValueEnum;
use tracing::{debug, warn};

use crate::domain::model::Selection;

/// Storage backend the selection is mirrored into after every mutation.
pub trait SelectionPersistence {
    fn load(&self) -> Result<Selection>;
    fn save(&self, selection: &[PathBuf]) -> Result<()>;

    /// Forget the stored selection.
    fn clear(&self) -> Result<()> {
        self.save(&[])
    }
}

/// How a fresh pick is merged into the stored selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SelectionMode {
    /// A non-empty pick replaces the stored selection.
    #[default]
    Replace,
    /// A pick is appended to the stored selection.
    Add,
}

/// Owns the ordered list of selected paths and keeps the persisted copy in sync.
///
/// Paths are made absolute on insertion but otherwise kept as given: no canonicalization and
/// no deduplication.
pub struct SelectionStore<P> {
    items: Selection,
    persistence: P,
}

impl<P: SelectionPersistence> SelectionStore<P> {
    /// Hydrate the store from its backend.
    pub fn open(persistence: P) -> Result<Self> {
        let items = persistence.load()?;
        debug!(count = items.len(), "loaded persisted selection");
        Ok(Self { items, persistence })
    }

    /// The active selection in insertion order.
    pub fn selection(&self) -> &[PathBuf] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Replace the selection with `paths`. An empty pick leaves the stored selection alone and
    /// returns `false`.
    pub fn replace<I>(&mut self, paths: I) -> bool
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let picked: Selection = paths.into_iter().map(|path| absolutize(&path)).collect();
        if picked.is_empty() {
            return false;
        }
        self.items = picked;
        self.persist();
        true
    }

    /// Append `paths` to the selection. Returns how many were added.
    pub fn add<I>(&mut self, paths: I) -> usize
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let before = self.items.len();
        self.items.extend(paths.into_iter().map(|path| absolutize(&path)));
        let added = self.items.len() - before;
        if added > 0 {
            self.persist();
        }
        added
    }

    /// Merge a pick according to `mode`. Returns whether the selection changed.
    pub fn apply<I>(&mut self, paths: I, mode: SelectionMode) -> bool
    where
        I: IntoIterator<Item = PathBuf>,
    {
        match mode {
            SelectionMode::Replace => self.replace(paths),
            SelectionMode::Add => self.add(paths) > 0,
        }
    }

    /// Drop every selected path. Unlike other mutations, a failure to forget the stored copy is
    /// returned.
    pub fn clear(&mut self) -> Result<()> {
        self.items.clear();
        self.persistence.clear()
    }

    fn persist(&self) {
        if let Err(err) = self.persistence.save(&self.items) {
            warn!(error = %err, "failed to persist selection");
        }
    }
}

fn absolutize(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryBackend {
        saved: Rc<RefCell<Vec<Selection>>>,
        initial: Selection,
        fail_saves: bool,
    }

    impl SelectionPersistence for MemoryBackend {
        fn load(&self) -> Result<Selection> {
            Ok(self.initial.clone())
        }

        fn save(&self, selection: &[PathBuf]) -> Result<()> {
            if self.fail_saves {
                anyhow::bail!("backend unavailable");
            }
            self.saved.borrow_mut().push(selection.to_vec());
            Ok(())
        }
    }

    fn paths(items: &[&str]) -> Selection {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn replace_swaps_selection_and_persists() -> Result<()> {
        let backend = MemoryBackend {
            initial: paths(&["/old"]),
            ..Default::default()
        };
        let mut store = SelectionStore::open(backend.clone())?;
        assert_eq!(store.selection(), paths(&["/old"]).as_slice());

        assert!(store.replace(paths(&["/a", "/b"])));
        assert_eq!(store.selection(), paths(&["/a", "/b"]).as_slice());
        assert_eq!(backend.saved.borrow().last(), Some(&paths(&["/a", "/b"])));
        Ok(())
    }

    #[test]
    fn empty_replace_keeps_previous_selection() -> Result<()> {
        let backend = MemoryBackend {
            initial: paths(&["/old"]),
            ..Default::default()
        };
        let mut store = SelectionStore::open(backend.clone())?;

        assert!(!store.replace(Vec::new()));
        assert_eq!(store.selection(), paths(&["/old"]).as_slice());
        assert!(backend.saved.borrow().is_empty());
        Ok(())
    }

    #[test]
    fn add_appends_and_keeps_duplicates() -> Result<()> {
        let backend = MemoryBackend {
            initial: paths(&["/a"]),
            ..Default::default()
        };
        let mut store = SelectionStore::open(backend.clone())?;

        assert_eq!(store.add(paths(&["/b", "/a"])), 2);
        assert_eq!(store.selection(), paths(&["/a", "/b", "/a"]).as_slice());
        assert!(store.apply(paths(&["/c"]), SelectionMode::Add));
        assert_eq!(store.len(), 4);
        assert_eq!(backend.saved.borrow().len(), 2);
        Ok(())
    }

    #[test]
    fn relative_paths_become_absolute() -> Result<()> {
        let mut store = SelectionStore::open(MemoryBackend::default())?;
        store.replace(vec![PathBuf::from("src/lib.rs")]);
        assert!(store.selection()[0].is_absolute());
        assert!(store.selection()[0].ends_with("src/lib.rs"));
        Ok(())
    }

    #[test]
    fn failed_persist_keeps_in_memory_state() -> Result<()> {
        let backend = MemoryBackend {
            fail_saves: true,
            ..Default::default()
        };
        let mut store = SelectionStore::open(backend)?;
        assert!(store.replace(paths(&["/a"])));
        assert_eq!(store.selection(), paths(&["/a"]).as_slice());

        assert!(store.clear().is_err());
        assert!(store.is_empty());
        Ok(())
    }

    #[test]
    fn clear_empties_backend() -> Result<()> {
        let backend = MemoryBackend {
            initial: paths(&["/a", "/b"]),
            ..Default::default()
        };
        let mut store = SelectionStore::open(backend.clone())?;

        store.clear()?;
        assert!(store.is_empty());
        assert_eq!(backend.saved.borrow().last(), Some(&Selection::new()));
        Ok(())
    }
}
