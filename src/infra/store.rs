use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{Mutex, PoisonError},
};

use heed::{types::Str, Database, Env, EnvOpenOptions};
use tracing::debug;

use crate::{config::get_data_dir, error::Result};

/// String key-value store that survives restarts.
pub trait LocalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Wrapper around LMDB database for persistent storage.
#[derive(Clone)]
pub struct Store {
    env: Env,
}

impl Store {
    /// Open the store for a network under the data directory.
    pub fn new(network: &str) -> Result<Self> {
        Self::with_path(get_data_dir().join(network).join("store.mdb"))
    }

    pub fn with_path(path: PathBuf) -> Result<Self> {
        debug!("Opening store at {}", path.display());
        std::fs::create_dir_all(&path).map_err(heed::Error::Io)?;
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(10 * 1024 * 1024) // 10MB
                .max_dbs(4)
                .open(path)?
        };
        Ok(Self { env })
    }
}

impl LocalStore for Store {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let rtxn = self.env.read_txn()?;
        let db: Option<Database<Str, Str>> = self.env.open_database(&rtxn, Some("metadata"))?;

        match db {
            Some(db) => Ok(db.get(&rtxn, key)?.map(str::to_string)),
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        let db: Database<Str, Str> = self.env.create_database(&mut wtxn, Some("metadata"))?;
        db.put(&mut wtxn, key, value)?;
        wtxn.commit()?;
        Ok(())
    }
}

/// Volatile store for tests and walletless sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LocalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
