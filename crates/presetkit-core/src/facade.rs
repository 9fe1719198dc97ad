//! PresetLibrary - ツール 1 つ分の Store + Codec
//!
//! UI（や CLI）が触るのはこの型だけで十分なようにしてあります。
//! - export: コレクション全体を envelope に包む
//! - import: 検証・重複排除したものを Store の先頭にマージ

use std::sync::Arc;

use tracing::info;

use crate::codec::{ExportFile, ImportResult, PresetCodec};
use crate::config::PresetConfig;
use crate::domain::PresetError;
use crate::store::{BuildError, PresetInput, PresetStore, PresetStoreBuilder};

pub struct PresetLibrary<T> {
    store: PresetStore<T>,
    codec: PresetCodec,
    export_hint: String,
}

impl<T: PresetInput> PresetLibrary<T> {
    /// The codec shares the store's clock so export/import timestamps line up.
    pub fn new(store: PresetStore<T>, export_hint: impl Into<String>) -> Self {
        let codec = PresetCodec::new(Arc::clone(store.clock()));
        Self {
            store,
            codec,
            export_hint: export_hint.into(),
        }
    }

    pub fn from_config(config: &PresetConfig) -> Result<Self, BuildError> {
        let store = PresetStoreBuilder::from_config(config).open()?;
        Ok(Self::new(store, config.export_hint.clone()))
    }

    pub fn store(&self) -> &PresetStore<T> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut PresetStore<T> {
        &mut self.store
    }

    /// Export everything using the configured file name hint.
    pub fn export(&self) -> Result<ExportFile, PresetError> {
        self.export_as(&self.export_hint)
    }

    pub fn export_as(&self, filename_hint: &str) -> Result<ExportFile, PresetError> {
        self.codec.export(self.store.presets(), filename_hint)
    }

    /// Validate `bytes` against the current ids and merge the survivors.
    ///
    /// The returned result lists exactly the presets that were added. A
    /// non-success result leaves the store untouched.
    pub fn import(&mut self, bytes: &[u8]) -> Result<ImportResult<T>, PresetError> {
        let mut result = self.codec.import::<T>(bytes, &self.store.ids());
        if !result.success || result.presets.is_empty() {
            return Ok(result);
        }

        let added = self.store.merge_imported(result.presets.clone())?;
        // codec already deduplicated against the same id set
        debug_assert_eq!(added, result.presets.len());
        result.presets.truncate(added);
        info!(key = %self.store.key(), added, skipped = result.duplicates_skipped, "import merged");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::ImportError;
    use crate::domain::TagType;
    use crate::impls::InMemoryPersistence;
    use crate::ports::FixedClock;
    use serde_json::{Value, json};

    fn library() -> PresetLibrary<Value> {
        let store = PresetStoreBuilder::new("budget")
            .persistence(InMemoryPersistence::new())
            .clock(FixedClock::at_millis(1_710_000_000_000))
            .open()
            .unwrap();
        PresetLibrary::new(store, "Monthly Budget")
    }

    #[test]
    fn export_uses_configured_hint() {
        let mut lib = library();
        lib.store_mut().add("Lean", json!({ "rent": 900 }), None, vec![]).unwrap();

        let file = lib.export().unwrap();
        assert!(file.file_name.starts_with("monthly-budget-presets-"));

        let parsed: Value = serde_json::from_slice(&file.bytes).unwrap();
        assert_eq!(parsed["presets"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn import_into_another_library_round_trips() {
        let mut source = library();
        let a = source.store_mut().add("A", json!(1), None, vec![]).unwrap();
        source.store_mut().add_tag(&a.id, TagType::Favorite, None).unwrap();
        source.store_mut().add("B", json!(2), None, vec![]).unwrap();
        let file = source.export().unwrap();

        let mut target = library();
        let result = target.import(&file.bytes).unwrap();

        assert!(result.success);
        assert_eq!(result.presets.len(), 2);
        assert_eq!(target.store().presets(), source.store().presets());
    }

    #[test]
    fn second_import_reports_all_duplicates() {
        let mut source = library();
        source.store_mut().add("A", json!(1), None, vec![]).unwrap();
        let file = source.export().unwrap();

        let mut target = library();
        target.import(&file.bytes).unwrap();
        let again = target.import(&file.bytes).unwrap();

        assert!(!again.success);
        assert_eq!(again.error, Some(ImportError::AllAlreadyExist));
        assert_eq!(again.duplicates_skipped, 1);
        assert_eq!(target.store().len(), 1);
    }

    #[test]
    fn failed_import_leaves_store_alone() {
        let mut lib = library();
        lib.store_mut().add("Keep", json!(0), None, vec![]).unwrap();

        let result = lib.import(b"{ nope").unwrap();
        assert_eq!(result.error, Some(ImportError::Parse));
        assert_eq!(lib.store().len(), 1);
    }
}
