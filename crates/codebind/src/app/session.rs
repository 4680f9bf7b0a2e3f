//! Workspace state persistence.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::app::assemble::write_atomically;
use crate::app::selection::SelectionPersistence;
use crate::domain::model::Selection;

const STATE_DIR: &str = ".codebind";
const STATE_FILE: &str = "state.json";

/// Key under which the last selection is stored.
pub const SELECTION_KEY: &str = "code-binder.selection";

/// Serialized form of the persisted selection.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SelectionRecord {
    pub paths: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,
}

/// Key-value store backed by a JSON object under `.codebind/`.
#[derive(Debug, Clone)]
pub struct StateStore {
    root: PathBuf,
    path: PathBuf,
}

impl StateStore {
    /// Create a store rooted at the provided workspace directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let path = root.join(STATE_DIR).join(STATE_FILE);
        Self { root, path }
    }

    /// Location of the state file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a value, returning `None` when either the file or the key is absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut entries = self.load_entries()?;
        match entries.remove(key) {
            Some(value) => {
                let parsed = serde_json::from_value(value).with_context(|| {
                    format!("invalid value for '{key}' in {}", self.path.display())
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// Store a value under `key`, keeping other keys intact.
    pub fn update<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let mut entries = self.load_entries()?;
        let value = serde_json::to_value(value).context("failed to serialize state value")?;
        entries.insert(key.to_owned(), value);
        self.save_entries(&entries)
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let mut entries = self.load_entries()?;
        let existed = entries.remove(key).is_some();
        if existed {
            self.save_entries(&entries)?;
        }
        Ok(existed)
    }

    fn load_entries(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let data = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read state file at {}", self.path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("invalid state data in {}", self.path.display()))
    }

    fn save_entries(&self, entries: &Map<String, Value>) -> Result<()> {
        let data = serde_json::to_string_pretty(entries).context("failed to serialize state")?;
        let dir = self.path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create state directory {}", dir.display()))?;
        write_atomically(&self.path, data.as_bytes())
            .with_context(|| format!("failed to write state file to {}", self.path.display()))
    }
}

impl SelectionPersistence for StateStore {
    fn load(&self) -> Result<Selection> {
        Ok(self
            .get::<SelectionRecord>(SELECTION_KEY)?
            .map(|record| record.paths)
            .unwrap_or_default())
    }

    fn save(&self, selection: &[PathBuf]) -> Result<()> {
        let saved_at = OffsetDateTime::now_utc().format(&Rfc3339).ok();
        let record = SelectionRecord {
            paths: selection.to_vec(),
            saved_at,
        };
        self.update(SELECTION_KEY, &record)
    }

    fn clear(&self) -> Result<()> {
        self.remove(SELECTION_KEY).map(|_| ())
    }
}
