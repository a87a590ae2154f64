use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use dashmap::DashMap;
use tracing::debug;

use crate::models::ViewKind;
use crate::storage::{Dataset, Storage};

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct DatasetKey {
    pub path: PathBuf,
    pub view: ViewKind
}

impl DatasetKey {
    /// Keys on the canonical path when the file exists so that `./a.csv` and `a.csv` share an entry.
    pub fn new(path: &Path, view: ViewKind) -> Self {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        Self { path, view }
    }
}

/// Session-wide cache of loaded views. Entries are never evicted.
pub struct DatasetStorage {
    cache: Arc<DashMap<DatasetKey, Arc<Dataset>>>
}

impl DatasetStorage {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(DashMap::new())
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns the cached view, or loads and caches it on first use.
    pub fn load_or_insert_with<F>(&self, key: DatasetKey, loader: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce() -> Result<Dataset>
    {
        if let Some(dataset) = self.load(&key) {
            debug!("Dataset cache hit for {} [{}]", key.path.display(), key.view);
            return Ok(dataset);
        }

        let dataset = Arc::new(loader()?);
        self.save(key, dataset.clone());

        Ok(dataset)
    }
}

impl Default for DatasetStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl Storage for DatasetStorage {
    fn load(&self, key: &DatasetKey) -> Option<Arc<Dataset>> {
        self.cache.get(key).map(|entry| entry.value().clone())
    }

    fn save(&self, key: DatasetKey, dataset: Arc<Dataset>) {
        self.cache.insert(key, dataset);
    }
}
