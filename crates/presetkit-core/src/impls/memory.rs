//! InMemoryPersistence - テスト・埋め込み用のストレージ
//!
//! # 実装詳細
//! - HashMap<String, Vec<u8>> でキーごとに保持
//! - Mutex で排他制御（Store の操作は同期的なので async は不要）

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::ports::{PersistenceError, PersistencePort};

#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry, e.g. to simulate data left behind by another writer.
    pub fn with_entry(self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.lock().insert(key.into(), bytes.into());
        self
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Raw stored bytes, bypassing the port API.
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PersistencePort for InMemoryPersistence {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.lock().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
