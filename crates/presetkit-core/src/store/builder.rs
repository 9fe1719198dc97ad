//! PresetStoreBuilder - Store の構築とワイヤリング
//!
//! # Fail-fast 設計
//! - キーが空、persistence 未設定などの配線ミスは `open()` 時に BuildError
//! - 保存データが壊れているのはエラーではない（空の Store として開く）

use std::sync::Arc;

use crate::config::PresetConfig;
use crate::impls::FilePersistence;
use crate::ports::{Clock, IdGenerator, PersistencePort, SystemClock, UlidGenerator};

use super::{PresetInput, PresetStore};

/// Appended to the name of a duplicated preset.
pub const DEFAULT_COPY_SUFFIX: &str = " (copy)";

/// ```ignore
/// let store = PresetStoreBuilder::new("retirement")
///     .persistence(InMemoryPersistence::new())
///     .open::<RetirementInput>()?;
/// ```
pub struct PresetStoreBuilder {
    key: String,
    persistence: Option<Arc<dyn PersistencePort>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    copy_suffix: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("storage key must not be empty")]
    EmptyKey,

    #[error("no persistence port configured for key {0:?}")]
    MissingPersistence(String),
}

impl PresetStoreBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            persistence: None,
            clock: None,
            ids: None,
            copy_suffix: DEFAULT_COPY_SUFFIX.to_string(),
        }
    }

    /// Key, copy suffix and a directory-backed port, all taken from config.
    pub fn from_config(config: &PresetConfig) -> Self {
        Self::new(config.key.clone())
            .persistence(FilePersistence::new(&config.storage_dir))
            .copy_suffix(config.copy_suffix.clone())
    }

    pub fn persistence(mut self, persistence: impl PersistencePort + 'static) -> Self {
        self.persistence = Some(Arc::new(persistence));
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    pub fn copy_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.copy_suffix = suffix.into();
        self
    }

    /// Validate the wiring and hydrate the store from the port.
    pub fn open<T: PresetInput>(self) -> Result<PresetStore<T>, BuildError> {
        if self.key.trim().is_empty() {
            return Err(BuildError::EmptyKey);
        }
        let persistence = self
            .persistence
            .ok_or_else(|| BuildError::MissingPersistence(self.key.clone()))?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&clock))));

        Ok(PresetStore::open(
            self.key,
            persistence,
            clock,
            ids,
            self.copy_suffix,
        ))
    }
}
