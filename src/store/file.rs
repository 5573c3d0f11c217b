use crate::store::{memory::MemoryStore, KeyValueStore};
use anyhow::{Context, Result};
use std::{collections::BTreeMap, path::PathBuf};

/// Keeps every key in one JSON object on disk. Each write rewrites the whole
/// file.
#[derive(Debug, Clone)]
pub struct FileStore {
    filename: PathBuf,
}

impl FileStore {
    pub fn new(filename: PathBuf) -> Self {
        Self { filename }
    }

    pub fn filename(&self) -> &PathBuf {
        &self.filename
    }

    fn load(&self) -> Result<MemoryStore> {
        if std::fs::metadata(&self.filename).is_err() {
            return Ok(MemoryStore::new());
        }

        let mut io = std::fs::OpenOptions::new();
        io.read(true);
        let io = io
            .open(&self.filename)
            .with_context(|| format!("could not open {}", self.filename.display()))?;

        let map: BTreeMap<String, String> = serde_json::from_reader(io)
            .with_context(|| format!("{} is not a valid store", self.filename.display()))?;
        Ok(map.into())
    }

    /// Like `load`, but an unparsable file is replaced rather than blocking
    /// every later write.
    fn load_for_write(&self) -> Result<MemoryStore> {
        match self.load() {
            Ok(store) => Ok(store),
            Err(e) if e.is::<serde_json::Error>() => {
                log::warn!("{:#}; it will be overwritten", e);
                Ok(MemoryStore::new())
            }
            Err(e) => Err(e),
        }
    }

    fn dump(&self, store: &MemoryStore) -> Result<()> {
        let mut io = std::fs::OpenOptions::new();
        io.write(true);
        io.truncate(true);
        io.create(true);
        let io = io
            .open(&self.filename)
            .with_context(|| format!("could not write {}", self.filename.display()))?;

        log::debug!("writing {} keys to {}", store.len(), self.filename.display());
        Ok(serde_json::to_writer_pretty(io, store.entries())?)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.load()?.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut store = self.load_for_write()?;
        store.set(key, value)?;
        self.dump(&store)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut store = self.load_for_write()?;
        store.remove(key)?;
        self.dump(&store)
    }
}
