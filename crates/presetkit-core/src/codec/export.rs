use serde::Serialize;
use tracing::info;

use super::PresetCodec;
use crate::domain::{ExportEnvelope, Preset, PresetError};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialized export, ready for whatever sink the caller has (download, file, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl PresetCodec {
    /// Wrap `presets` in a version-1 envelope stamped with the current time.
    pub fn export<T: Serialize>(
        &self,
        presets: &[Preset<T>],
        filename_hint: &str,
    ) -> Result<ExportFile, PresetError> {
        let now = self.clock.now();
        let envelope = ExportEnvelope::new(now.timestamp_millis(), presets);
        let bytes = serde_json::to_vec_pretty(&envelope)?;

        let mut base = slug::slugify(filename_hint);
        if base.is_empty() {
            base = "presets".to_string();
        }
        let file_name = format!("{base}-presets-{}.json", now.format("%Y-%m-%d"));

        info!(count = presets.len(), %file_name, "exported presets");
        Ok(ExportFile {
            file_name,
            content_type: JSON_CONTENT_TYPE,
            bytes,
        })
    }
}
