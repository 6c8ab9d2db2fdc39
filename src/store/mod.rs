use std::{
    collections::HashMap,
    sync::Mutex,
};

use anyhow::Result;
use serde_json::Value;

mod sqlite;

pub use sqlite::SqliteStore;

/// Durable key-value store the ledger persists through. Implementations must
/// survive process restarts (except [`MemoryStore`], which exists for tests).
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;
    fn set(&self, key: &str, value: Value) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store backed by a HashMap. Used in tests and anywhere
/// durability is not needed.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        let guard = self.data.lock().unwrap();
        Ok(guard.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut guard = self.data.lock().unwrap();
        guard.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut guard = self.data.lock().unwrap();
        guard.remove(key);
        Ok(())
    }
}
